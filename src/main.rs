use anyhow::{Context, Result};
use clap::Parser;
use kel_console::app::Application;
use kel_console::cli::{Cli, Commands};
use kel_console::common::{load_config, StartupConfig};
use kel_console_core::init_logging;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let startup_config = StartupConfig {
        config_path: cli.config.clone(),
        api_url: cli.api_url.clone(),
        log_level: cli.log_level.clone(),
        log_format: cli.log_format.clone(),
    };

    let config = load_config(&startup_config)?;
    init_logging(&config.logging).context("初始化日志系统失败")?;

    info!("KEL 控制台启动, API: {}", config.api.base_url);

    let mut app = Application::new(config)?;

    match cli.command {
        Commands::Watch { route, days } => {
            app.watch(route, days).await?;
            info!("KEL 控制台已退出");
        }
        command => match app.execute(command).await {
            Ok(output) => println!("{output}"),
            Err(e) => {
                error!("命令执行失败: {:#}", e);
                return Err(e);
            }
        },
    }

    Ok(())
}
