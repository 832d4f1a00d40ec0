use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 指定配置文件路径的环境变量
pub const CONFIG_FILE_ENV: &str = "SITE2PDF_CONFIG";

/// 渲染器实现
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// 进程内通过 CDP 驱动无头浏览器
    Chromium,
    /// 调用外部无头浏览器命令行
    Cli,
}

impl FromStr for RendererKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" | "cdp" => Ok(Self::Chromium),
            "cli" | "process" => Ok(Self::Cli),
            _ => Err(()),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP 监听地址
    pub bind_addr: String,
    /// 压缩包输出目录（交付后即删除）
    pub output_dir: PathBuf,
    /// 临时根目录，每个任务在其下拥有独立工作目录
    pub temp_dir: PathBuf,
    /// 使用的渲染器
    pub renderer: RendererKind,
    /// 浏览器可执行文件，为空时自动查找
    pub chrome_executable: Option<PathBuf>,
    /// 命令行渲染器程序
    pub cli_program: PathBuf,
    /// 单页模式的渲染时限
    pub single_timeout_ms: u64,
    /// 批量模式的渲染时限
    pub bulk_timeout_ms: u64,
    /// 页面加载后等待脚本执行的固定时间
    pub settle_delay_ms: u64,
    /// 同一任务内同时渲染的 URL 数量，1 表示严格串行
    pub max_concurrent_renders: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4000".to_string(),
            output_dir: PathBuf::from("output"),
            temp_dir: env::temp_dir().join("simple-web-to-pdf"),
            renderer: RendererKind::Chromium,
            chrome_executable: None,
            cli_program: PathBuf::from("chromium"),
            single_timeout_ms: 30_000,
            bulk_timeout_ms: 60_000,
            settle_delay_ms: 2_500,
            max_concurrent_renders: 1,
            verbose_logging: false,
        }
    }
}

/// 配置文件中允许出现的字段，全部可选
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    bind_addr: Option<String>,
    output_dir: Option<PathBuf>,
    temp_dir: Option<PathBuf>,
    renderer: Option<RendererKind>,
    chrome_executable: Option<PathBuf>,
    cli_program: Option<PathBuf>,
    single_timeout_ms: Option<u64>,
    bulk_timeout_ms: Option<u64>,
    settle_delay_ms: Option<u64>,
    max_concurrent_renders: Option<usize>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 加载配置：默认值 → 配置文件（可选）→ 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let base = match env::var_os(CONFIG_FILE_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 仅使用环境变量覆盖默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置，未出现的字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let file: FileConfig = toml::from_str(text)?;
        let mut config = Self::default();
        if let Some(v) = file.bind_addr {
            config.bind_addr = v;
        }
        if let Some(v) = file.output_dir {
            config.output_dir = v;
        }
        if let Some(v) = file.temp_dir {
            config.temp_dir = v;
        }
        if let Some(v) = file.renderer {
            config.renderer = v;
        }
        if file.chrome_executable.is_some() {
            config.chrome_executable = file.chrome_executable;
        }
        if let Some(v) = file.cli_program {
            config.cli_program = v;
        }
        if let Some(v) = file.single_timeout_ms {
            config.single_timeout_ms = v;
        }
        if let Some(v) = file.bulk_timeout_ms {
            config.bulk_timeout_ms = v;
        }
        if let Some(v) = file.settle_delay_ms {
            config.settle_delay_ms = v;
        }
        if let Some(v) = file.max_concurrent_renders {
            config.max_concurrent_renders = v;
        }
        if let Some(v) = file.verbose_logging {
            config.verbose_logging = v;
        }
        Ok(config)
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("SITE2PDF_BIND") {
            self.bind_addr = v;
        }
        if let Some(v) = lookup("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("TMP_DIR") {
            self.temp_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("RENDERER") {
            self.renderer = v.parse().map_err(|_| parse_failed("RENDERER", &v, "chromium|cli"))?;
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(PathBuf::from(v)).filter(|p| !p.as_os_str().is_empty());
        }
        if let Some(v) = lookup("RENDER_CLI") {
            self.cli_program = PathBuf::from(v);
        }
        self.single_timeout_ms = parse_or(&lookup, "SINGLE_TIMEOUT_MS", self.single_timeout_ms)?;
        self.bulk_timeout_ms = parse_or(&lookup, "BULK_TIMEOUT_MS", self.bulk_timeout_ms)?;
        self.settle_delay_ms = parse_or(&lookup, "SETTLE_DELAY_MS", self.settle_delay_ms)?;
        self.max_concurrent_renders =
            parse_or(&lookup, "MAX_CONCURRENT_RENDERS", self.max_concurrent_renders)?;
        self.verbose_logging = parse_or(&lookup, "VERBOSE_LOGGING", self.verbose_logging)?;

        self.validate()?;
        Ok(self)
    }

    /// 校验配置值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_renders == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrent_renders".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        if self.single_timeout_ms == 0 || self.bulk_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_ms".to_string(),
                reason: "渲染时限必须大于 0".to_string(),
            });
        }
        if self.bulk_timeout_ms < self.single_timeout_ms {
            return Err(ConfigError::InvalidValue {
                field: "bulk_timeout_ms".to_string(),
                reason: format!(
                    "批量时限 {} ms 不能小于单页时限 {} ms",
                    self.bulk_timeout_ms, self.single_timeout_ms
                ),
            });
        }
        if self.settle_delay_ms >= self.single_timeout_ms {
            return Err(ConfigError::InvalidValue {
                field: "settle_delay_ms".to_string(),
                reason: format!(
                    "等待时间 {} ms 必须小于单页时限 {} ms",
                    self.settle_delay_ms, self.single_timeout_ms
                ),
            });
        }
        Ok(())
    }

    pub fn single_timeout(&self) -> Duration {
        Duration::from_millis(self.single_timeout_ms)
    }

    pub fn bulk_timeout(&self) -> Duration {
        Duration::from_millis(self.bulk_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var_name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| parse_failed(var_name, &value, std::any::type_name::<T>())),
        None => Ok(default),
    }
}

fn parse_failed(var_name: &str, value: &str, expected_type: &str) -> ConfigError {
    ConfigError::EnvVarParseFailed {
        var_name: var_name.to_string(),
        value: value.to_string(),
        expected_type: expected_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_match_server_behaviour() {
        let config = Config::default();
        assert_eq!(config.single_timeout(), Duration::from_secs(30));
        assert_eq!(config.bulk_timeout(), Duration::from_secs(60));
        assert_eq!(config.settle_delay(), Duration::from_millis(2500));
        assert_eq!(config.max_concurrent_renders, 1);
        assert!(config.bulk_timeout() > config.single_timeout());
    }

    #[test]
    fn test_env_overrides_apply() {
        let config = Config::default()
            .with_overrides(lookup_from(&[
                ("RENDERER", "cli"),
                ("SINGLE_TIMEOUT_MS", "5000"),
                ("BULK_TIMEOUT_MS", "12345"),
                ("MAX_CONCURRENT_RENDERS", "3"),
                ("TMP_DIR", "/var/tmp/s2p"),
            ]))
            .expect("配置应当合法");

        assert_eq!(config.renderer, RendererKind::Cli);
        assert_eq!(config.single_timeout_ms, 5000);
        assert_eq!(config.bulk_timeout_ms, 12345);
        assert_eq!(config.max_concurrent_renders, 3);
        assert_eq!(config.temp_dir, PathBuf::from("/var/tmp/s2p"));
    }

    #[test]
    fn test_malformed_env_value_is_rejected() {
        let err = Config::default()
            .with_overrides(lookup_from(&[("BULK_TIMEOUT_MS", "soon")]))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::EnvVarParseFailed { ref var_name, .. } if var_name == "BULK_TIMEOUT_MS"
        ));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let err = Config::default()
            .with_overrides(lookup_from(&[("MAX_CONCURRENT_RENDERS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_bulk_timeout_shorter_than_single_is_rejected() {
        let err = Config::default()
            .with_overrides(lookup_from(&[
                ("SINGLE_TIMEOUT_MS", "60000"),
                ("BULK_TIMEOUT_MS", "30000"),
            ]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "bulk_timeout_ms"
        ));
    }

    #[test]
    fn test_settle_delay_must_fit_in_single_timeout() {
        let err = Config::default()
            .with_overrides(lookup_from(&[
                ("SINGLE_TIMEOUT_MS", "2000"),
                ("SETTLE_DELAY_MS", "2500"),
            ]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "settle_delay_ms"
        ));
    }

    #[test]
    fn test_toml_layer_keeps_unset_defaults() {
        let config = Config::from_toml_str(
            r#"
            renderer = "cli"
            cli_program = "/usr/bin/chromium"
            settle_delay_ms = 100
            "#,
        )
        .expect("TOML 应当可以解析");

        assert_eq!(config.renderer, RendererKind::Cli);
        assert_eq!(config.cli_program, PathBuf::from("/usr/bin/chromium"));
        assert_eq!(config.settle_delay_ms, 100);
        assert_eq!(config.bulk_timeout_ms, 60_000);
    }

    #[test]
    fn test_toml_unknown_field_is_error() {
        assert!(Config::from_toml_str("llm_model_name = \"x\"").is_err());
    }
}
