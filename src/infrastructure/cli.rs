//! 外部进程渲染器
//!
//! 调用无头浏览器命令行的 `--print-to-pdf`，进程在超时或调用方放弃时被结束。

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout as within;
use tracing::{debug, warn};

use crate::error::{RenderCause, RenderFailure};
use crate::infrastructure::Renderer;
use crate::utils::{truncate_text, unique_name};

/// 通过子进程渲染的渲染器
pub struct CliRenderer {
    program: PathBuf,
    scratch_dir: PathBuf,
    settle_delay: Duration,
}

impl CliRenderer {
    pub fn new(
        program: impl Into<PathBuf>,
        scratch_dir: impl Into<PathBuf>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            scratch_dir: scratch_dir.into(),
            settle_delay,
        }
    }

    fn command(&self, url: &str, output: &std::path::Path, profile_dir: &std::path::Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--no-pdf-header-footer")
            .arg(format!("--user-data-dir={}", profile_dir.display()))
            .arg(format!(
                "--virtual-time-budget={}",
                self.settle_delay.as_millis()
            ))
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(
        &self,
        url: &str,
        timeout: Duration,
        output: &std::path::Path,
        profile_dir: &std::path::Path,
    ) -> Result<Vec<u8>, RenderCause> {
        // 以 `-` 开头的参数会被当作命令行选项
        if url.starts_with('-') {
            return Err(RenderCause::Navigation(format!("非法 URL: {url}")));
        }

        let child = self
            .command(url, output, profile_dir)
            .spawn()
            .map_err(|e| RenderCause::Launch(format!("{}: {e}", self.program.display())))?;

        // 超时后 future 被丢弃，kill_on_drop 会结束子进程
        let result = within(timeout, child.wait_with_output())
            .await
            .map_err(|_| RenderCause::Timeout(timeout))??;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(RenderCause::Crash {
                code: result.status.code(),
                stderr: truncate_text(stderr.trim(), 500),
            });
        }

        let bytes = tokio::fs::read(output).await?;
        if bytes.is_empty() {
            return Err(RenderCause::Capture("渲染进程没有输出内容".to_string()));
        }
        Ok(bytes)
    }
}

#[async_trait]
impl Renderer for CliRenderer {
    async fn render(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, RenderFailure> {
        let name = unique_name("cli_render");
        let output = self.scratch_dir.join(format!("{name}.pdf"));
        let profile_dir = self.scratch_dir.join(format!("{name}_profile"));
        debug!("命令行渲染: {} -> {}", url, output.display());

        let result = self.run(url, timeout, &output, &profile_dir).await;

        if let Err(e) = tokio::fs::remove_file(&output).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("清理渲染输出 {} 失败: {}", output.display(), e);
            }
        }
        if let Err(e) = tokio::fs::remove_dir_all(&profile_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("清理浏览器用户目录 {} 失败: {}", profile_dir.display(), e);
            }
        }

        result.map_err(|cause| RenderFailure::new(url, cause))
    }

    fn name(&self) -> &'static str {
        "cli"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_launch_failure() {
        let scratch = tempfile::tempdir().expect("创建临时目录失败");
        let renderer = CliRenderer::new(
            "/nonexistent/site2pdf-renderer",
            scratch.path(),
            Duration::from_millis(0),
        );

        let err = renderer
            .render("https://a.example", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err.url, "https://a.example");
        assert!(matches!(err.cause, RenderCause::Launch(_)));
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_option_like_url_is_rejected_before_spawn() {
        let scratch = tempfile::tempdir().expect("创建临时目录失败");
        let renderer = CliRenderer::new("/nonexistent/x", scratch.path(), Duration::ZERO);

        let err = renderer
            .render("--remote-debugging-port=9222", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err.cause, RenderCause::Navigation(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_process_times_out() {
        let scratch = tempfile::tempdir().expect("创建临时目录失败");
        let script = scratch.path().join("slow.sh");
        std::fs::write(&script, "#!/bin/sh\nsleep 10\n").unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        let renderer = CliRenderer::new(&script, scratch.path(), Duration::ZERO);

        let err = renderer
            .render("https://timeout.example", Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_process_reports_crash() {
        let scratch = tempfile::tempdir().expect("创建临时目录失败");
        let script = scratch.path().join("fail.sh");
        std::fs::write(&script, "#!/bin/sh\necho boom >&2\nexit 3\n").unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        let renderer = CliRenderer::new(&script, scratch.path(), Duration::ZERO);

        let err = renderer
            .render("https://a.example", Duration::from_secs(5))
            .await
            .unwrap_err();

        match err.cause {
            RenderCause::Crash { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected cause: {other:?}"),
        }
    }
}
