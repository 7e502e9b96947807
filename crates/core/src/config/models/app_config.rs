use std::path::Path;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use super::{
    api::ApiConfig,
    polling::{DiskConfig, PollingConfig, TaskViewConfig},
};
use crate::logging::LogConfig;

/// 默认配置文件搜索路径
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["config/console.toml", "console.toml"];

/// Console configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub tasks: TaskViewConfig,
    #[serde(default)]
    pub disk: DiskConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

impl ConsoleConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Built-in defaults
    /// 2. Config file (TOML format); an explicit path must exist
    /// 3. Environment variable overrides, e.g. `KEL_CONSOLE_API__BASE_URL`
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("KEL_CONSOLE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: ConsoleConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: ConsoleConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    pub fn validate(&self) -> Result<()> {
        self.api.validate().context("API配置验证失败")?;
        self.polling.validate().context("刷新配置验证失败")?;
        self.tasks.validate().context("任务视图配置验证失败")?;
        self.logging.validate().context("日志配置验证失败")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ConsoleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.polling.interval_seconds, 5);
        assert_eq!(config.tasks.page_size, 20);
        assert_eq!(config.disk.default_path, "/data");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ConsoleConfig::from_toml(
            r#"
[api]
base_url = "http://kel.internal:9000"

[polling]
overview_days = 7
"#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://kel.internal:9000");
        assert_eq!(config.api.request_timeout_seconds, 30);
        assert_eq!(config.polling.overview_days, Some(7));
        assert_eq!(config.polling.interval_seconds, 5);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let result = ConsoleConfig::from_toml(
            r#"
[polling]
interval_seconds = 0
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let result = ConsoleConfig::from_toml(
            r#"
[api]
base_url = "ftp://example.com"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ConsoleConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(ConsoleConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[tasks]
page_size = 50

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = ConsoleConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.tasks.page_size, 50);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(ConsoleConfig::load(Some("/nonexistent/console.toml")).is_err());
    }
}
