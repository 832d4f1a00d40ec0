//! 转换任务数据模型

use std::fmt::Display;
use std::path::{Path, PathBuf};

use tracing::debug;

/// 任务状态
///
/// `Created -> WorkspaceReady -> Processing -> Completed -> Delivered`，
/// `Abandoned` 只能由 `Created`（空输入或工作目录创建失败）进入。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    WorkspaceReady,
    Processing,
    Completed,
    Delivered,
    Abandoned,
}

impl JobState {
    /// 判断状态迁移是否合法
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Created, WorkspaceReady)
                | (Created, Abandoned)
                | (WorkspaceReady, Processing)
                | (Processing, Completed)
                | (Completed, Delivered)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Delivered | JobState::Abandoned)
    }
}

/// 单个 URL 的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 渲染成功，PDF 已写入工作目录
    Success { artifact_path: PathBuf },
    /// 渲染失败，原因已写入失败标记文件
    Failure { reason: String },
}

/// 单个 URL 的转换记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// 原始 URL
    pub url: String,
    /// 在输入中的位置（从 1 开始）
    pub position: usize,
    pub outcome: Outcome,
}

impl ConversionResult {
    pub fn success(url: impl Into<String>, position: usize, artifact_path: PathBuf) -> Self {
        Self {
            url: url.into(),
            position,
            outcome: Outcome::Success { artifact_path },
        }
    }

    pub fn failure(url: impl Into<String>, position: usize, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            position,
            outcome: Outcome::Failure {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// 成功时返回 PDF 路径
    pub fn artifact_path(&self) -> Option<&Path> {
        match &self.outcome {
            Outcome::Success { artifact_path } => Some(artifact_path),
            Outcome::Failure { .. } => None,
        }
    }
}

/// 一次批量转换任务
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// 任务 ID，同时作为工作目录与压缩包的名称
    pub id: String,
    /// 按提交顺序排列的 URL
    pub urls: Vec<String>,
    /// 任务独占的工作目录
    pub workspace: Option<PathBuf>,
    /// 每个 URL 一条记录，按位置排序
    pub results: Vec<ConversionResult>,
    state: JobState,
}

impl ConversionJob {
    pub fn new(id: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            id: id.into(),
            urls,
            workspace: None,
            results: Vec::new(),
            state: JobState::Created,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// 推进状态；非法迁移返回 `false` 且状态不变
    pub fn advance(&mut self, next: JobState) -> bool {
        if !self.state.can_transition_to(next) {
            debug!("[任务 {}] 忽略非法状态迁移 {:?} -> {:?}", self.id, self.state, next);
            return false;
        }
        debug!("[任务 {}] 状态 {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
        true
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// 成功的记录，按位置排序
    pub fn successes(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| r.is_success())
    }
}

impl Display for ConversionJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[任务 {} 状态 {:?} 成功 {}/{}]",
            self.id,
            self.state,
            self.succeeded(),
            self.urls.len()
        )
    }
}
