pub mod log_config;
pub mod log_level;

pub use log_config::{LogConfig, OutputFormat};
pub use log_level::LogLevel;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化日志系统
///
/// `RUST_LOG` 存在时优先于配置中的级别。
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let level = config.level()?;
    let format = config.output_format()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        OutputFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("初始化JSON日志格式失败")?,
        OutputFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()
            .context("初始化Pretty日志格式失败")?,
        OutputFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()
            .context("初始化Text日志格式失败")?,
    }

    Ok(())
}
