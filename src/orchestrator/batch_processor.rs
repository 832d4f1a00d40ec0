//! 批量转换处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **输入校验**：空列表直接拒绝，不创建任何目录
//! 2. **准备环境**：为任务创建独立工作目录
//! 3. **逐个渲染**：按输入顺序处理每个 URL，单个失败不影响整体
//! 4. **打包**：把成功的页面按位置命名写入压缩包
//! 5. **清理**：无论打包成败都删除工作目录
//!
//! 并发数为 1 时严格串行；大于 1 时并发渲染，但结果始终按位置排序。

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{error, info};

use crate::config::Config;
use crate::error::JobError;
use crate::infrastructure::{Renderer, Workspace};
use crate::models::{ConversionJob, ConversionResult, JobState};
use crate::services::{ArchiveAssembler, ArchiveEntry, Artifact};
use crate::utils::logging::{log_job_start, print_job_stats};
use crate::utils::naming::{download_name, page_file_name};
use crate::utils::unique_name;
use crate::workflow::{PageCtx, PageFlow};

/// 删除工作目录前调用的钩子，参数为工作目录路径
pub type CleanupHook = Arc<dyn Fn(&Path) + Send + Sync>;

/// 批量任务的结果
#[derive(Debug)]
pub struct BulkOutcome {
    /// 已完成的任务，包含每个 URL 的记录
    pub job: ConversionJob,
    /// 生成的压缩包
    pub archive: Artifact,
}

/// 批量转换处理器
#[derive(Clone)]
pub struct BatchProcessor {
    flow: PageFlow,
    temp_dir: PathBuf,
    assembler: ArchiveAssembler,
    max_concurrent: usize,
    pre_cleanup_hook: Option<CleanupHook>,
}

impl fmt::Debug for BatchProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("temp_dir", &self.temp_dir)
            .field("max_concurrent", &self.max_concurrent)
            .finish_non_exhaustive()
    }
}

impl BatchProcessor {
    pub fn new(config: &Config, renderer: Arc<dyn Renderer>) -> Self {
        Self::with_parts(
            renderer,
            config.bulk_timeout(),
            config.temp_dir.clone(),
            config.output_dir.clone(),
            config.max_concurrent_renders,
        )
    }

    pub fn with_parts(
        renderer: Arc<dyn Renderer>,
        timeout: Duration,
        temp_dir: PathBuf,
        output_dir: PathBuf,
        max_concurrent: usize,
    ) -> Self {
        Self {
            flow: PageFlow::new(renderer, timeout),
            temp_dir,
            assembler: ArchiveAssembler::new(output_dir),
            max_concurrent: max_concurrent.max(1),
            pre_cleanup_hook: None,
        }
    }

    /// 设置删除工作目录前的钩子
    pub fn with_pre_cleanup_hook(mut self, hook: CleanupHook) -> Self {
        self.pre_cleanup_hook = Some(hook);
        self
    }

    /// 运行一次批量任务
    ///
    /// 只有空输入、工作目录创建失败和压缩包写入失败会返回错误；
    /// 单个 URL 的失败记录在结果里，即使全部失败也会返回一个空压缩包。
    pub async fn run(&self, urls: Vec<String>) -> Result<BulkOutcome, JobError> {
        let mut job = ConversionJob::new(unique_name("bulkpdf"), urls);

        if job.urls.is_empty() {
            job.advance(JobState::Abandoned);
            return Err(JobError::EmptyInput);
        }

        let workspace = match Workspace::create(&self.temp_dir, &job.id).await {
            Ok(workspace) => workspace,
            Err(e) => {
                error!("[任务 {}] ❌ 无法准备工作目录: {}", job.id, e);
                job.advance(JobState::Abandoned);
                return Err(e);
            }
        };
        job.workspace = Some(workspace.path().to_path_buf());
        job.advance(JobState::WorkspaceReady);

        log_job_start(&job.id, job.urls.len());
        job.advance(JobState::Processing);
        job.results = self.process_all(&job, workspace.path()).await;
        job.advance(JobState::Completed);
        print_job_stats(&job.id, job.succeeded(), job.failed());

        let archive = self
            .assembler
            .assemble(&format!("{}.zip", job.id), archive_entries(&job.results))
            .await;

        if let Some(hook) = &self.pre_cleanup_hook {
            hook(workspace.path());
        }
        workspace.destroy().await;

        let path = archive?;
        info!("[任务 {}] 📦 压缩包就绪，等待交付", job.id);
        Ok(BulkOutcome {
            archive: Artifact::zip(path, download_name("bulkpdf", "zip")),
            job,
        })
    }

    /// 处理全部 URL，返回按位置排序的结果
    async fn process_all(&self, job: &ConversionJob, workspace: &Path) -> Vec<ConversionResult> {
        let total = job.urls.len();
        let contexts: Vec<PageCtx> = job
            .urls
            .iter()
            .enumerate()
            .map(|(index, url)| PageCtx::new(&job.id, index + 1, total, url))
            .collect();

        // buffered 按提交顺序产出结果，与完成顺序无关
        stream::iter(contexts)
            .map(|ctx| {
                let flow = &self.flow;
                async move { flow.run(&ctx, workspace).await }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await
    }
}

/// 成功的结果按位置命名，失败的不进入压缩包
fn archive_entries(results: &[ConversionResult]) -> Vec<ArchiveEntry> {
    results
        .iter()
        .filter_map(|result| {
            result
                .artifact_path()
                .map(|path| ArchiveEntry::new(page_file_name(result.position), path))
        })
        .collect()
}
