//! 日志工具模块
//!
//! 提供 tracing 初始化以及任务日志的格式化输出

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化全局日志
///
/// `RUST_LOG` 优先；否则按 `verbose` 选择 debug / info。重复调用时静默忽略。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 网页转 PDF 服务启动");
    info!("🌐 监听地址: {}", config.bind_addr);
    info!("🖨️ 渲染器: {:?}", config.renderer);
    info!("📁 输出目录: {}", config.output_dir.display());
    info!("🗂️ 临时目录: {}", config.temp_dir.display());
    info!(
        "⏱️ 渲染时限: 单页 {} ms / 批量 {} ms",
        config.single_timeout_ms, config.bulk_timeout_ms
    );
    info!("📊 单任务最大并发渲染数: {}", config.max_concurrent_renders);
    info!("{}", "=".repeat(60));
}

/// 记录批量任务开始信息
pub fn log_job_start(job_id: &str, total: usize) {
    info!("{}", "=".repeat(60));
    info!("📦 [任务 {}] 开始处理，共 {} 个 URL", job_id, total);
    info!("{}", "=".repeat(60));
}

/// 记录单个 URL 开始处理
pub fn log_page_start(job_id: &str, position: usize, total: usize, url: &str) {
    info!(
        "[任务 {}] 📄 ({}/{}) 渲染: {}",
        job_id,
        position,
        total,
        truncate_text(url, 120)
    );
}

/// 打印任务完成统计
pub fn print_job_stats(job_id: &str, succeeded: usize, failed: usize) {
    let total = succeeded + failed;
    info!("{}", "─".repeat(60));
    info!("📊 [任务 {}] 处理完成", job_id);
    info!("✅ 成功: {}/{}", succeeded, total);
    if failed > 0 {
        warn!("❌ 失败: {}", failed);
    }
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
