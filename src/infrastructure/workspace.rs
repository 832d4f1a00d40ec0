//! 工作目录管理 - 基础设施层
//!
//! 每个任务在临时根目录下拥有一个独立目录，任务结束后整体删除。
//! 任务异常终止（panic、被取消）时由 `Drop` 兜底删除。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::JobError;
use crate::utils::sanitize;

/// 任务独占的临时目录
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    destroyed: bool,
}

impl Workspace {
    /// 在 `root` 下创建名为 `job_id`（净化后）的新目录
    ///
    /// 目录已存在视为失败，保证两个任务不会共用同一目录。
    pub async fn create(root: &Path, job_id: &str) -> Result<Self, JobError> {
        let path = root.join(sanitize_id(job_id));
        tokio::fs::create_dir(&path)
            .await
            .map_err(|source| JobError::SetupFailure {
                path: path.clone(),
                source,
            })?;
        debug!("创建工作目录: {}", path.display());
        Ok(Self {
            path,
            destroyed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 删除工作目录
    pub async fn destroy(mut self) {
        destroy_workspace(&self.path).await;
        self.destroyed = true;
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.destroyed {
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => warn!("🧹 任务未正常结束，已删除工作目录: {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("删除工作目录 {} 失败: {}", self.path.display(), e),
        }
    }
}

/// 递归删除目录；目录不存在时什么也不做，其他错误只记录日志
pub async fn destroy_workspace(path: &Path) {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => debug!("已删除工作目录: {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("删除工作目录 {} 失败: {}", path.display(), e),
    }
}

/// 任务 ID 由 `unique_name` 生成时已经是安全字符，这里兜底处理外部传入的 ID。
/// 与 [`sanitize`] 不同，保留 ID 的完整长度，避免截断掉区分后缀。
fn sanitize_id(job_id: &str) -> String {
    if !job_id.is_empty()
        && job_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        job_id.to_string()
    } else {
        sanitize(job_id)
    }
}
