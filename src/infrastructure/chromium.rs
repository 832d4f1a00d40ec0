//! 进程内 CDP 渲染器

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::browser::HeadlessSession;
use crate::error::{RenderCause, RenderFailure};
use crate::infrastructure::Renderer;
use crate::utils::unique_name;

/// 通过 chromiumoxide 驱动无头浏览器的渲染器
pub struct ChromiumRenderer {
    chrome_executable: Option<PathBuf>,
    profile_root: PathBuf,
    settle_delay: Duration,
}

impl ChromiumRenderer {
    /// # 参数
    /// - `chrome_executable`: 浏览器路径，为空时自动查找
    /// - `profile_root`: 每次渲染的浏览器用户目录都建在这里
    /// - `settle_delay`: 页面加载后的固定等待时间
    pub fn new(
        chrome_executable: Option<PathBuf>,
        profile_root: impl Into<PathBuf>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            chrome_executable,
            profile_root: profile_root.into(),
            settle_delay,
        }
    }

    async fn render_with_profile(
        &self,
        url: &str,
        timeout: Duration,
        profile_dir: &Path,
    ) -> Result<Vec<u8>, RenderCause> {
        let deadline = Instant::now() + timeout;

        let session = timeout_at(
            deadline,
            HeadlessSession::launch(self.chrome_executable.as_deref(), profile_dir),
        )
        .await
        .map_err(|_| RenderCause::Timeout(timeout))??;

        let captured = timeout_at(deadline, session.print_pdf(url, self.settle_delay)).await;

        // 成功、失败、超时都要关闭浏览器
        session.close().await;

        captured.map_err(|_| RenderCause::Timeout(timeout))?
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn render(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, RenderFailure> {
        let profile_dir = self.profile_root.join(unique_name("chromium_profile"));

        let result = self.render_with_profile(url, timeout, &profile_dir).await;

        if let Err(e) = tokio::fs::remove_dir_all(&profile_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("清理浏览器用户目录 {} 失败: {}", profile_dir.display(), e);
            }
        }

        result.map_err(|cause| {
            debug!("Chromium 渲染 {} 失败: {}", url, cause);
            RenderFailure::new(url, cause)
        })
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}
