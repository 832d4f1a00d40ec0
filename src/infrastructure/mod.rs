//! 基础设施层
//!
//! 持有稀缺资源（浏览器进程、临时目录），只暴露能力。

pub mod chromium;
pub mod cli;
pub mod renderer;
pub mod workspace;

use std::sync::Arc;

pub use chromium::ChromiumRenderer;
pub use cli::CliRenderer;
pub use renderer::Renderer;
pub use workspace::{destroy_workspace, Workspace};

use crate::config::{Config, RendererKind};

/// 根据配置选择渲染器实现
pub fn build_renderer(config: &Config) -> Arc<dyn Renderer> {
    match config.renderer {
        RendererKind::Chromium => Arc::new(ChromiumRenderer::new(
            config.chrome_executable.clone(),
            config.temp_dir.clone(),
            config.settle_delay(),
        )),
        RendererKind::Cli => Arc::new(CliRenderer::new(
            config.cli_program.clone(),
            config.temp_dir.clone(),
            config.settle_delay(),
        )),
    }
}
