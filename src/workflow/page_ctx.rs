//! 页面处理上下文
//!
//! 封装"我正在处理哪个任务的第几个 URL"这一信息

use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::utils::naming::page_file_name;

/// 页面处理上下文
#[derive(Debug, Clone)]
pub struct PageCtx {
    /// 任务 ID
    pub job_id: String,
    /// URL 在输入中的位置（从 1 开始）
    pub position: usize,
    /// 本任务 URL 总数（仅用于日志显示）
    pub total: usize,
    pub url: String,
}

impl PageCtx {
    pub fn new(job_id: impl Into<String>, position: usize, total: usize, url: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            position,
            total,
            url: url.into(),
        }
    }

    /// 压缩包中的成员名，如 `page_001.pdf`
    pub fn file_name(&self) -> String {
        page_file_name(self.position)
    }

    /// 工作目录中的页面文件路径
    pub fn artifact_path(&self, workspace: &Path) -> PathBuf {
        workspace.join(self.file_name())
    }
}

impl Display for PageCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[任务 {} 页面#{}/{}]",
            self.job_id, self.position, self.total
        )
    }
}
