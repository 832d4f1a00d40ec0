use std::path::Path;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::error::RenderCause;

/// A4 纸张尺寸（英寸）
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

/// 关闭浏览器的最长等待时间，超时后直接结束进程
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// 一次性的无头浏览器会话
///
/// 每次渲染独占一个浏览器进程，用完即关，不在多个 URL 之间复用。
pub struct HeadlessSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl HeadlessSession {
    /// 启动无头浏览器
    ///
    /// # 参数
    /// - `chrome_executable`: 浏览器路径，为空时由 chromiumoxide 自动查找
    /// - `profile_dir`: 本次会话独占的用户数据目录
    pub async fn launch(
        chrome_executable: Option<&Path>,
        profile_dir: &Path,
    ) -> Result<Self, RenderCause> {
        info!("🚀 启动无头浏览器...");
        debug!("用户数据目录: {}", profile_dir.display());

        let mut builder = BrowserConfig::builder()
            .new_headless_mode()
            .user_data_dir(profile_dir)
            .args(vec![
                "--disable-gpu",
                "--no-sandbox",
                "--disable-setuid-sandbox",
                "--disable-dev-shm-usage",
            ]);
        if let Some(path) = chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(|e| {
            error!("配置无头浏览器失败: {}", e);
            RenderCause::Launch(e)
        })?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            RenderCause::Launch(e.to_string())
        })?;
        debug!("无头浏览器启动成功");

        // 在后台处理浏览器事件
        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self { browser, handler })
    }

    /// 打开 URL，等待加载和脚本执行完成后导出 PDF
    pub async fn print_pdf(&self, url: &str, settle_delay: Duration) -> Result<Vec<u8>, RenderCause> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderCause::Launch(format!("创建页面失败: {e}")))?;

        page.goto(url)
            .await
            .map_err(|e| RenderCause::Navigation(e.to_string()))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| RenderCause::Navigation(e.to_string()))?;
        debug!("页面导航成功: {}", url);

        // 许多页面在加载完成后才异步渲染内容
        sleep(settle_delay).await;

        let params = PrintToPdfParams {
            print_background: Some(true),
            paper_width: Some(A4_WIDTH_IN),
            paper_height: Some(A4_HEIGHT_IN),
            ..Default::default()
        };
        let bytes = page
            .pdf(params)
            .await
            .map_err(|e| RenderCause::Capture(e.to_string()))?;

        info!("✅ 已导出 PDF: {} ({} 字节)", url, bytes.len());
        Ok(bytes)
    }

    /// 关闭浏览器并回收事件循环任务，任何情况下都不会返回错误
    pub async fn close(mut self) {
        match timeout(CLOSE_GRACE, self.browser.close()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                warn!("关闭浏览器失败，强制结束: {}", e);
                self.kill().await;
            }
            Err(_) => {
                warn!("关闭浏览器超时，强制结束");
                self.kill().await;
            }
        }

        if let Err(e) = self.browser.wait().await {
            debug!("等待浏览器进程退出失败: {}", e);
        }
        self.handler.abort();
        debug!("无头浏览器已关闭");
    }

    async fn kill(&mut self) {
        if let Some(Err(e)) = self.browser.kill().await {
            warn!("结束浏览器进程失败: {}", e);
        }
    }
}
