//! 单页转换处理器 - 编排层
//!
//! 批量流程的单项特例：不建工作目录，直接在临时根目录下写一个 PDF。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::config::Config;
use crate::error::JobError;
use crate::infrastructure::Renderer;
use crate::services::Artifact;
use crate::utils::naming::download_name;
use crate::utils::unique_name;

/// 单页转换处理器
#[derive(Clone)]
pub struct SingleProcessor {
    renderer: Arc<dyn Renderer>,
    timeout: Duration,
    temp_dir: PathBuf,
}

impl SingleProcessor {
    pub fn new(config: &Config, renderer: Arc<dyn Renderer>) -> Self {
        Self::with_parts(renderer, config.single_timeout(), config.temp_dir.clone())
    }

    pub fn with_parts(renderer: Arc<dyn Renderer>, timeout: Duration, temp_dir: PathBuf) -> Self {
        Self {
            renderer,
            timeout,
            temp_dir,
        }
    }

    /// 把一个 URL 转换成 PDF
    pub async fn run(&self, url: &str) -> Result<Artifact, JobError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(JobError::EmptyInput);
        }

        info!("📄 单页转换: {}", url);
        let bytes = self.renderer.render(url, self.timeout).await.map_err(|e| {
            error!("❌ 单页转换失败: {}", e);
            JobError::Render(e)
        })?;

        let path = self.temp_dir.join(format!("{}.pdf", unique_name("single")));
        // 先交给 Artifact，写入失败时残留文件也会被删除
        let artifact = Artifact::pdf(path, download_name("site2pdf", "pdf"));
        tokio::fs::write(artifact.path(), &bytes)
            .await
            .map_err(|source| JobError::ArtifactWrite {
                path: artifact.path().to_path_buf(),
                source,
            })?;

        info!("✅ 单页转换完成: {} ({} 字节)", url, bytes.len());
        Ok(artifact)
    }
}
