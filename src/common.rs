use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use kel_console_controller::Confirmation;
use kel_console_core::ConsoleConfig;
use tokio::signal;
use tracing::{error, info};

/// 通用的启动参数
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    pub config_path: Option<String>,
    pub api_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

/// 加载配置并应用命令行覆盖
pub fn load_config(startup_config: &StartupConfig) -> Result<ConsoleConfig> {
    let mut config = ConsoleConfig::load(startup_config.config_path.as_deref())
        .with_context(|| match &startup_config.config_path {
            Some(path) => format!("加载配置文件失败: {path}"),
            None => "加载默认配置失败".to_string(),
        })?;

    if let Some(ref api_url) = startup_config.api_url {
        config.api.base_url = api_url.clone();
    }
    if let Some(ref level) = startup_config.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref format) = startup_config.log_format {
        config.logging.format = format.clone();
    }

    config.validate().context("命令行参数覆盖后的配置无效")?;
    Ok(config)
}

/// 等待关闭信号
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}

/// 在终端上询问 y/N
pub struct StdinConfirmation;

impl Confirmation for StdinConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} (y/N) ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(_) => input.trim().eq_ignore_ascii_case("y"),
            Err(e) => {
                error!("读取确认输入失败: {}", e);
                false
            }
        }
    }
}
