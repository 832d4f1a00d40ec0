//! 渲染器接口 - 基础设施层
//!
//! 只暴露"把 URL 变成 PDF 字节"的能力，不认识任务、工作目录或压缩包。

use std::time::Duration;

use async_trait::async_trait;

use crate::error::RenderFailure;

/// 渲染器
///
/// 约定：
/// - `url` 非空即可，语法是否合法由底层渲染器判断并以 [`RenderFailure`] 报告
/// - `timeout` 约束整个渲染过程：启动、导航、等待脚本和导出
/// - 每次调用使用独立的渲染器实例，并在任何返回路径上释放它
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, RenderFailure>;

    /// 用于日志的名称
    fn name(&self) -> &'static str;
}
