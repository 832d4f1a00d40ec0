use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::error;

use crate::api::delivery::deliver;
use crate::api::form::SubmittedForm;
use crate::api::AppState;
use crate::error::JobError;
use crate::models::JobState;

pub const PAGES_REQUESTED: HeaderName = HeaderName::from_static("x-pages-requested");
pub const PAGES_CONVERTED: HeaderName = HeaderName::from_static("x-pages-converted");
pub const PAGES_FAILED: HeaderName = HeaderName::from_static("x-pages-failed");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub time: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

pub async fn single(State(state): State<AppState>, form: SubmittedForm) -> Response {
    let url = form.get("url").unwrap_or_default().trim().to_string();
    if url.is_empty() {
        return (StatusCode::BAD_REQUEST, "No URL.").into_response();
    }

    // 独立任务：客户端断开也会跑完，产物无人接收时由 Artifact 自行删除
    let processor = state.single.clone();
    let job = tokio::spawn(async move { processor.run(&url).await });

    match job.await {
        Ok(Ok(artifact)) => deliver(artifact).await,
        Ok(Err(JobError::EmptyInput)) => (StatusCode::BAD_REQUEST, "No URL.").into_response(),
        Ok(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to generate PDF.\n{e}"),
        )
            .into_response(),
        Err(e) => join_error(e),
    }
}

pub async fn bulk(State(state): State<AppState>, form: SubmittedForm) -> Response {
    let urls = form.url_list("urls");
    if urls.is_empty() {
        return (StatusCode::BAD_REQUEST, "No URLs submitted.").into_response();
    }

    let processor = state.batch.clone();
    let job = tokio::spawn(async move { processor.run(urls).await });

    match job.await {
        Ok(Ok(mut outcome)) => {
            outcome.job.advance(JobState::Delivered);
            let mut response = deliver(outcome.archive).await;
            if response.status().is_success() {
                let headers = response.headers_mut();
                headers.insert(PAGES_REQUESTED, HeaderValue::from(outcome.job.urls.len()));
                headers.insert(PAGES_CONVERTED, HeaderValue::from(outcome.job.succeeded()));
                headers.insert(PAGES_FAILED, HeaderValue::from(outcome.job.failed()));
            }
            response
        }
        Ok(Err(e)) if e.is_input_error() => {
            (StatusCode::BAD_REQUEST, "No URLs submitted.").into_response()
        }
        Ok(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to build archive.\n{e}"),
        )
            .into_response(),
        Err(e) => join_error(e),
    }
}

fn join_error(e: tokio::task::JoinError) -> Response {
    error!("转换任务异常终止: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Conversion task failed.").into_response()
}
