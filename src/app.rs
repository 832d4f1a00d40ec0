//! 应用启动
//!
//! 准备目录、选择渲染器、绑定端口并运行 HTTP 服务，Ctrl-C 时优雅退出。

use std::path::Path;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::build_renderer;
use crate::utils::logging::log_startup;

/// 应用主结构
pub struct App {
    listener: TcpListener,
    state: AppState,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        log_startup(&config);

        ensure_dir(&config.output_dir).await?;
        ensure_dir(&config.temp_dir).await?;

        let renderer = build_renderer(&config);
        let state = AppState::new(&config, renderer);

        let listener = TcpListener::bind(&config.bind_addr)
            .await
            .map_err(AppError::Server)?;

        Ok(Self { listener, state })
    }

    /// 运行 HTTP 服务直到收到退出信号
    pub async fn run(self) -> AppResult<()> {
        if let Ok(addr) = self.listener.local_addr() {
            info!("✅ 网页转 PDF 服务已启动: http://{}", addr);
        }

        axum::serve(self.listener, api::router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(AppError::Server)?;

        info!("👋 服务已停止");
        Ok(())
    }
}

async fn ensure_dir(path: &Path) -> AppResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| AppError::Directory {
            path: path.to_path_buf(),
            source,
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("监听退出信号失败: {}", e);
        std::future::pending::<()>().await;
    }
    info!("收到退出信号，正在停止服务...");
}
