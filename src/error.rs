use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// 单个 URL 渲染失败的具体原因
#[derive(Debug, Error)]
pub enum RenderCause {
    /// 超过单页渲染时限（包含启动、导航与等待脚本的时间）
    #[error("渲染超时 ({} ms)", .0.as_millis())]
    Timeout(Duration),
    /// 浏览器或渲染进程启动失败
    #[error("启动渲染器失败: {0}")]
    Launch(String),
    /// 页面导航失败
    #[error("页面导航失败: {0}")]
    Navigation(String),
    /// 导出 PDF 失败
    #[error("导出 PDF 失败: {0}")]
    Capture(String),
    /// 渲染进程异常退出
    #[error("渲染进程异常退出 (code: {code:?}): {stderr}")]
    Crash { code: Option<i32>, stderr: String },
    /// 读写中间文件失败
    #[error("渲染文件读写失败: {0}")]
    Io(#[from] io::Error),
}

/// 渲染失败：所有失败情况统一收敛为 `{url, cause}`
#[derive(Debug, Error)]
#[error("渲染 {url} 失败: {cause}")]
pub struct RenderFailure {
    pub url: String,
    #[source]
    pub cause: RenderCause,
}

impl RenderFailure {
    pub fn new(url: impl Into<String>, cause: RenderCause) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.cause, RenderCause::Timeout(_))
    }
}

/// 压缩包写入错误
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("文件读写失败: {0}")]
    Io(#[from] io::Error),
    #[error("ZIP 编码失败: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("压缩任务异常终止: {0}")]
    Join(String),
}

/// 任务级错误
///
/// 单个 URL 的渲染失败在批量模式下会被吸收进结果列表，不会出现在这里；
/// 只有输入校验、环境准备和压缩包写入失败才会中止任务。
#[derive(Debug, Error)]
pub enum JobError {
    /// 没有提交任何有效 URL
    #[error("未提交任何 URL")]
    EmptyInput,
    /// 无法创建工作目录
    #[error("无法创建工作目录 {}: {source}", .path.display())]
    SetupFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// 单页模式下的渲染失败
    #[error(transparent)]
    Render(#[from] RenderFailure),
    /// 写入渲染结果失败
    #[error("写入文件 {} 失败: {source}", .path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// 生成压缩包失败
    #[error("生成压缩包 {} 失败: {source}", .path.display())]
    ArchiveFailure {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },
}

impl JobError {
    /// 是否属于调用方的输入错误
    pub fn is_input_error(&self) -> bool {
        matches!(self, JobError::EmptyInput)
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件 {} 失败: {source}", .path.display())]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// 配置文件解析失败
    #[error("解析配置文件 {} 失败: {source}", .path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    #[error("任务错误: {0}")]
    Job(#[from] JobError),
    #[error("初始化目录 {} 失败: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("服务运行失败: {0}")]
    Server(#[source] io::Error),
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
