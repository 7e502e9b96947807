use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ConsoleError, ConsoleResult};
use crate::logging::log_level::LogLevel;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum log level to display
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format for logs
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

/// Output format for log entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
    Pretty,
}

impl FromStr for OutputFormat {
    type Err = ConsoleError;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            "pretty" => Ok(OutputFormat::Pretty),
            _ => Err(ConsoleError::config_error(format!(
                "不支持的日志格式: {format}"
            ))),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl LogConfig {
    pub fn level(&self) -> ConsoleResult<LogLevel> {
        self.level.parse()
    }

    pub fn output_format(&self) -> ConsoleResult<OutputFormat> {
        self.format.parse()
    }

    pub fn validate(&self) -> ConsoleResult<()> {
        self.level()?;
        self.output_format()?;
        Ok(())
    }
}
