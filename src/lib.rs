//! # site2pdf
//!
//! 把网页 URL 转换为 PDF 的 HTTP 服务，支持单页下载和批量打包下载。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（浏览器进程、临时目录），只暴露能力
//! - `Renderer` - `render(url, timeout)`，Chromium 与命令行两种实现
//! - `Workspace` - 任务独占的临时目录
//!
//! ### ② 业务能力层（Services）
//! - `FailureWriter` - 写失败标记
//! - `ArchiveAssembler` - 组装 ZIP
//! - `Artifact` - 待交付文件，丢弃即删除
//!
//! ### ③ 流程层（Workflow）
//! - `PageFlow` - 一个 URL 的完整处理流程（渲染 → 保存 / 失败标记）
//!
//! ### ④ 编排层（Orchestration）
//! - `BatchProcessor` - 批量任务的状态机、并发控制与清理
//! - `SingleProcessor` - 单页转换
//!
//! ### ⑤ 接口层（API）
//! - `api/` - axum 路由、表单提取、文件交付

pub mod api;
pub mod app;
pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::{Config, RendererKind};
pub use error::{AppError, AppResult, JobError, RenderCause, RenderFailure};
pub use infrastructure::Renderer;
pub use models::{ConversionJob, ConversionResult, JobState, Outcome};
pub use orchestrator::{BatchProcessor, BulkOutcome, SingleProcessor};
