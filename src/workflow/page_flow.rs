//! 页面处理流程 - 流程层
//!
//! 核心职责：定义"一个 URL"的完整处理流程
//!
//! 1. 调用渲染器
//! 2. 成功 → 写入 `page_XXX.pdf`
//! 3. 失败 → 写入失败标记（兜底），继续下一个

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::infrastructure::Renderer;
use crate::models::ConversionResult;
use crate::services::FailureWriter;
use crate::utils::logging::log_page_start;
use crate::workflow::page_ctx::PageCtx;

/// 页面处理流程
///
/// - 不持有工作目录，只在其中写文件
/// - 永远返回一条结果记录，不向上抛出错误
#[derive(Clone)]
pub struct PageFlow {
    renderer: Arc<dyn Renderer>,
    timeout: Duration,
    failure_writer: FailureWriter,
}

impl PageFlow {
    pub fn new(renderer: Arc<dyn Renderer>, timeout: Duration) -> Self {
        Self {
            renderer,
            timeout,
            failure_writer: FailureWriter::new(),
        }
    }

    pub async fn run(&self, ctx: &PageCtx, workspace: &Path) -> ConversionResult {
        log_page_start(&ctx.job_id, ctx.position, ctx.total, &ctx.url);

        let reason = match self.renderer.render(&ctx.url, self.timeout).await {
            Ok(bytes) => {
                let path = ctx.artifact_path(workspace);
                match tokio::fs::write(&path, &bytes).await {
                    Ok(()) => {
                        info!("{} ✓ 已保存 {} ({} 字节)", ctx, ctx.file_name(), bytes.len());
                        return ConversionResult::success(&ctx.url, ctx.position, path);
                    }
                    Err(e) => format!("写入 {} 失败: {}", path.display(), e),
                }
            }
            Err(failure) => failure.cause.to_string(),
        };

        warn!("{} ❌ {} 转换失败: {}", ctx, ctx.url, reason);
        if let Err(e) = self
            .failure_writer
            .write(workspace, ctx.position, &ctx.url, &reason)
            .await
        {
            error!("{} 写入失败标记失败: {}", ctx, e);
        }

        ConversionResult::failure(&ctx.url, ctx.position, reason)
    }
}
