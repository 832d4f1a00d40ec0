//! 待交付的文件
//!
//! 文件归 [`Artifact`] 所有：无论下载完成、客户端断开还是无人接收，
//! `Artifact` 被丢弃时文件都会被删除。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// 交付给调用方的文件
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
    download_name: String,
    content_type: &'static str,
}

impl Artifact {
    pub fn new(
        path: impl Into<PathBuf>,
        download_name: impl Into<String>,
        content_type: &'static str,
    ) -> Self {
        Self {
            path: path.into(),
            download_name: download_name.into(),
            content_type,
        }
    }

    /// PDF 文件
    pub fn pdf(path: impl Into<PathBuf>, download_name: impl Into<String>) -> Self {
        Self::new(path, download_name, "application/pdf")
    }

    /// ZIP 压缩包
    pub fn zip(path: impl Into<PathBuf>, download_name: impl Into<String>) -> Self {
        Self::new(path, download_name, "application/zip")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn download_name(&self) -> &str {
        &self.download_name
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("🧹 已删除交付文件: {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("删除交付文件 {} 失败: {}", self.path.display(), e),
        }
    }
}
