//! 交付与清理
//!
//! 以附件形式流式返回文件；文件随响应体一起释放，下载完成或客户端断开后即被删除。

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::Stream;
use tokio_util::io::ReaderStream;
use tracing::error;

use crate::services::Artifact;

/// 持有 [`Artifact`] 的文件流，流被丢弃时文件随之删除
struct ArtifactStream {
    inner: ReaderStream<tokio::fs::File>,
    _artifact: Artifact,
}

impl Stream for ArtifactStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// 把文件作为下载响应返回
pub async fn deliver(artifact: Artifact) -> Response {
    let file = match tokio::fs::File::open(artifact.path()).await {
        Ok(file) => file,
        Err(e) => {
            error!("打开交付文件 {} 失败: {}", artifact.path().display(), e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to deliver file.").into_response();
        }
    };
    let length = file.metadata().await.ok().map(|meta| meta.len());

    let content_type = artifact.content_type();
    let disposition = format!(
        "attachment; filename=\"{}\"",
        artifact.download_name().replace('"', "'")
    );

    let body = Body::from_stream(ArtifactStream {
        inner: ReaderStream::new(file),
        _artifact: artifact,
    });

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if let Some(len) = length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }
    response
}
