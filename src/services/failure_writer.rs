//! 失败标记写入服务 - 业务能力层
//!
//! 只负责"在工作目录里写失败标记"，不关心流程

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::utils::naming::failure_marker_name;

/// 失败标记写入服务
///
/// 职责：
/// - 为渲染失败的 URL 写一个与页面文件并列的 `fail_page_XXX.pdf.txt`
/// - 标记随工作目录一起删除，不会进入压缩包
#[derive(Debug, Default, Clone, Copy)]
pub struct FailureWriter;

impl FailureWriter {
    pub fn new() -> Self {
        Self
    }

    /// 写入失败标记
    ///
    /// # 参数
    /// - `workspace`: 任务工作目录
    /// - `position`: URL 在输入中的位置（从 1 开始）
    /// - `url`: 失败的 URL
    /// - `reason`: 失败原因
    ///
    /// # 返回
    /// 返回标记文件路径
    pub async fn write(
        &self,
        workspace: &Path,
        position: usize,
        url: &str,
        reason: &str,
    ) -> std::io::Result<PathBuf> {
        let path = workspace.join(failure_marker_name(position));
        debug!("写入失败标记: {} | {}", path.display(), url);

        let content = format!("FAILED: {url}\n{reason}\n");
        tokio::fs::write(&path, content).await?;

        Ok(path)
    }
}
