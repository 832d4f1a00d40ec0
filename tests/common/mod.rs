#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use site2pdf::{RenderCause, RenderFailure, Renderer};

/// 按脚本返回结果的渲染器
///
/// - `failing` 中的 URL 立即失败
/// - `hanging` 中的 URL 一直挂起，直到超过调用方给的时限
/// - 其余 URL 返回 `%PDF-fake <url>`
#[derive(Default)]
pub struct ScriptedRenderer {
    failing: HashSet<String>,
    hanging: HashSet<String>,
    delays: Vec<(String, Duration)>,
    calls: Mutex<Vec<(String, Duration)>>,
}

impl ScriptedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn hanging(mut self, url: &str) -> Self {
        self.hanging.insert(url.to_string());
        self
    }

    pub fn delayed(mut self, url: &str, delay: Duration) -> Self {
        self.delays.push((url.to_string(), delay));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    /// 每次调用收到的渲染时限
    pub fn timeouts(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

pub fn fake_pdf(url: &str) -> Vec<u8> {
    format!("%PDF-fake {url}").into_bytes()
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn render(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, RenderFailure> {
        self.calls.lock().unwrap().push((url.to_string(), timeout));

        if self.hanging.contains(url) {
            let _ = tokio::time::timeout(timeout, tokio::time::sleep(Duration::from_secs(3600))).await;
            return Err(RenderFailure::new(url, RenderCause::Timeout(timeout)));
        }
        if let Some((_, delay)) = self.delays.iter().find(|(u, _)| u == url) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(url) {
            return Err(RenderFailure::new(
                url,
                RenderCause::Navigation("net::ERR_NAME_NOT_RESOLVED".to_string()),
            ));
        }
        Ok(fake_pdf(url))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// 列出目录下的条目名
pub fn entries(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// 渲染时直接 panic 的渲染器
pub struct PanickingRenderer;

#[async_trait]
impl Renderer for PanickingRenderer {
    async fn render(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>, RenderFailure> {
        panic!("renderer crashed while rendering {url}");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}
