//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量转换处理器
//! - 管理任务生命周期（工作目录、渲染、打包、清理）
//! - 控制任务内的并发数量
//! - 输出任务统计信息
//!
//! ### `single_processor` - 单页转换处理器
//! - 批量流程的单项特例
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<URL>)
//!     ↓
//! workflow::PageFlow (处理单个 URL)
//!     ↓
//! services (能力层：failure marker / archive)
//!     ↓
//! infrastructure (基础设施：Renderer / Workspace)
//! ```

pub mod batch_processor;
pub mod single_processor;

pub use batch_processor::{BatchProcessor, BulkOutcome, CleanupHook};
pub use single_processor::SingleProcessor;
