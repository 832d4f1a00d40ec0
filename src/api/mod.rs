//! HTTP 接口层
//!
//! - `POST /single` 单页转换，返回 PDF
//! - `POST /bulk` 批量转换，返回 ZIP
//! - `GET /health` 健康检查

pub mod delivery;
pub mod form;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::config::Config;
use crate::infrastructure::Renderer;
use crate::orchestrator::{BatchProcessor, SingleProcessor};

/// 路由共享状态，各任务之间没有可变共享数据
#[derive(Clone)]
pub struct AppState {
    pub single: Arc<SingleProcessor>,
    pub batch: Arc<BatchProcessor>,
}

impl AppState {
    pub fn new(config: &Config, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            single: Arc::new(SingleProcessor::new(config, renderer.clone())),
            batch: Arc::new(BatchProcessor::new(config, renderer)),
        }
    }

    pub fn from_processors(single: SingleProcessor, batch: BatchProcessor) -> Self {
        Self {
            single: Arc::new(single),
            batch: Arc::new(batch),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/single", post(handlers::single))
        .route("/bulk", post(handlers::bulk))
        .route("/health", get(handlers::health))
        .with_state(state)
}
