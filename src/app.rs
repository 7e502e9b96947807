use std::fs;

use anyhow::{Context, Result};
use kel_console_client::{ConfigKeyScope, ConsoleApiClient};
use kel_console_controller::{
    Confirmation, ConsoleSession, Deletion, FixedConfirmation, RefreshEvent, RefreshTarget,
    TableExportIntent, TableLoadIntent, TriggerKind, TriggerOutcome, TriggerParams,
};
use kel_console_core::ConsoleConfig;
use kel_console_domain::{TaskFilter, TaskStatus};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::cli::{
    Commands, ConfigActions, DiskActions, JobActions, TableActions, TaskActions,
};
use crate::common::{wait_for_shutdown_signal, StdinConfirmation};
use crate::render;

/// 控制台应用：持有配置、API 客户端与会话
pub struct Application {
    config: ConsoleConfig,
    client: ConsoleApiClient,
    session: ConsoleSession,
}

impl Application {
    pub fn new(config: ConsoleConfig) -> Result<Self> {
        let client = ConsoleApiClient::from_config(&config.api).context("创建API客户端失败")?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: ConsoleConfig, client: ConsoleApiClient) -> Self {
        let session = ConsoleSession::new(client.clone(), &config);
        Self {
            config,
            client,
            session,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn session(&self) -> &ConsoleSession {
        &self.session
    }

    /// 执行一次性命令并返回要输出的文本
    pub async fn execute(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Watch { .. } => Err(anyhow::anyhow!("watch 命令需要通过 Application::watch 运行")),
            Commands::Stats { days } => {
                let stats = self.client.task_stats(days).await.context("获取任务统计失败")?;
                Ok(render::render_stats(&stats))
            }
            Commands::Tasks(cmd) => self.handle_task_action(cmd.action).await,
            Commands::Jobs(cmd) => self.handle_job_action(cmd.action).await,
            Commands::Tables(cmd) => self.handle_table_action(cmd.action).await,
            Commands::Configs(cmd) => self.handle_config_action(cmd.action).await,
            Commands::Disk(cmd) => self.handle_disk_action(cmd.action).await,
        }
    }

    async fn handle_task_action(&self, action: TaskActions) -> Result<String> {
        let services = self.session.services();
        match action {
            TaskActions::List { job, status, page } => {
                let status = match status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                    Some(raw) => raw
                        .parse::<TaskStatus>()
                        .map_err(|e| anyhow::anyhow!(e))?
                        .as_str()
                        .to_string(),
                    None => String::new(),
                };
                services
                    .tasks
                    .seed_filter(TaskFilter::new(job.unwrap_or_default(), status))
                    .await;
                let result = services
                    .tasks
                    .change_page(page)
                    .await
                    .context("获取任务列表失败")?;
                let pagination = services.tasks.pagination().await;
                Ok(format!(
                    "{}\n{}",
                    render::render_task_table(&result.items),
                    render::render_pagination(&pagination)
                ))
            }
            TaskActions::Recent { days } => {
                let recent = self
                    .client
                    .recent_tasks(self.config.tasks.recent_limit, days)
                    .await
                    .context("获取最近任务失败")?;
                Ok(render::render_task_table(&recent.data))
            }
            TaskActions::Get { task_id } => {
                let detail = services
                    .details
                    .open_detail(task_id)
                    .await
                    .with_context(|| format!("获取任务详情失败: {task_id}"))?;
                Ok(render::render_task_detail(&detail))
            }
            TaskActions::Manifest { task_id } => {
                let view = services
                    .details
                    .open_manifest(task_id)
                    .await
                    .with_context(|| format!("获取任务清单失败: {task_id}"))?;
                Ok(render::render_manifest(&view))
            }
            TaskActions::Delete { task_id, force } => {
                let confirmation = confirmation_for(force);
                match self
                    .session
                    .delete_task(task_id, confirmation.as_ref())
                    .await
                    .context("删除任务失败")?
                {
                    Deletion::Deleted => Ok(format!("任务删除成功: {task_id}")),
                    Deletion::Cancelled => Ok("已取消删除操作".to_string()),
                }
            }
        }
    }

    async fn handle_job_action(&self, action: JobActions) -> Result<String> {
        let triggers = &self.session.services().triggers;
        match action {
            JobActions::Extract { config_key } => {
                let outcome = triggers
                    .trigger(&config_key, TriggerKind::Extract, None)
                    .await?;
                outcome_to_result(outcome)
            }
            JobActions::Load {
                config_key,
                source_batch,
            } => {
                let outcome = triggers
                    .trigger(
                        &config_key,
                        TriggerKind::Load,
                        Some(TriggerParams { source_batch }),
                    )
                    .await?;
                outcome_to_result(outcome)
            }
            JobActions::Keys { scope } => {
                let keys = triggers
                    .list_config_keys(ConfigKeyScope::from(scope))
                    .await
                    .context("获取配置键列表失败")?;
                Ok(keys.join("\n"))
            }
            JobActions::Tables { config_key } => {
                let tables = triggers
                    .list_tables(&config_key)
                    .await
                    .with_context(|| format!("获取表列表失败: {config_key}"))?;
                Ok(tables.join("\n"))
            }
        }
    }

    async fn handle_table_action(&self, action: TableActions) -> Result<String> {
        let services = self.session.services();
        match action {
            TableActions::Export {
                config_key,
                table,
                mode,
            } => {
                let outcome = services
                    .triggers
                    .trigger_table_export(TableExportIntent {
                        config_key,
                        table_name: table,
                        mode,
                    })
                    .await?;
                outcome_to_result(outcome)
            }
            TableActions::Load {
                config_key,
                table,
                source_batch,
            } => {
                let outcome = services
                    .triggers
                    .trigger_table_load(TableLoadIntent {
                        config_key,
                        table_name: table,
                        source_batch,
                    })
                    .await?;
                outcome_to_result(outcome)
            }
            TableActions::History { page } => {
                let records = services
                    .manual_exports
                    .change_page(page)
                    .await
                    .context("获取手工导出历史失败")?;
                let pagination = services.manual_exports.pagination().await;
                Ok(render::render_manual_exports(&records, &pagination))
            }
        }
    }

    async fn handle_config_action(&self, action: ConfigActions) -> Result<String> {
        let configs = &self.session.services().configs;
        match action {
            ConfigActions::List => {
                let entries = configs.list_detailed().await.context("获取配置列表失败")?;
                Ok(render::render_config_entries(&entries))
            }
            ConfigActions::Keys => {
                let keys = configs.list().await.context("获取配置键列表失败")?;
                Ok(keys.join("\n"))
            }
            ConfigActions::Get { config_key } => configs
                .read(&config_key)
                .await
                .with_context(|| format!("读取配置失败: {config_key}")),
            ConfigActions::Create { key, file } => {
                let content = read_yaml(&file)?;
                configs
                    .create(key.as_deref(), &content)
                    .await
                    .context("创建配置失败")?;
                Ok("配置创建成功".to_string())
            }
            ConfigActions::Update { config_key, file } => {
                let content = read_yaml(&file)?;
                configs
                    .update(&config_key, &content)
                    .await
                    .with_context(|| format!("更新配置失败: {config_key}"))?;
                Ok(format!("配置更新成功: {config_key}"))
            }
            ConfigActions::Delete { config_key, force } => {
                let confirmation = confirmation_for(force);
                match configs
                    .delete(&config_key, confirmation.as_ref())
                    .await
                    .with_context(|| format!("删除配置失败: {config_key}"))?
                {
                    Deletion::Deleted => Ok(format!("配置删除成功: {config_key}")),
                    Deletion::Cancelled => Ok("已取消删除操作".to_string()),
                }
            }
            ConfigActions::Import => configs.import_all().await.context("导入配置失败"),
            ConfigActions::Spec => configs
                .fetch_spec_document()
                .await
                .context("获取配置说明失败"),
        }
    }

    async fn handle_disk_action(&self, action: DiskActions) -> Result<String> {
        let disk = &self.session.services().disk;
        match action {
            DiskActions::Check { path } => {
                let path = path.unwrap_or_else(|| disk.default_path().to_string());
                let report = disk
                    .check(&path)
                    .await
                    .with_context(|| format!("检查磁盘空间失败: {path}"))?;
                Ok(render::render_disk_report(&report))
            }
        }
    }

    /// 挂载会话并持续渲染，直到收到关闭信号
    pub async fn watch(&mut self, route: Option<String>, days: Option<u32>) -> Result<()> {
        if days.is_some() {
            self.session.services().tasks.set_overview_days(days).await;
        }
        if let Some(route) = route {
            match self.session.apply_route(&route).await {
                Some(seed) => info!("已应用启动路由: {:?}", seed),
                None => warn!("启动路由未匹配，使用默认视图: {}", route),
            }
        }

        let mut events = self.session.subscribe();
        self.session.mount();

        let shutdown = wait_for_shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => println!("{}", self.render_snapshot(&event).await),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("渲染落后，跳过 {} 次刷新", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = &mut shutdown => {
                    info!("收到关闭信号，停止刷新");
                    break;
                }
            }
        }

        self.session.unmount();
        Ok(())
    }

    /// 按刷新目标渲染当前持有的状态
    pub async fn render_snapshot(&self, event: &RefreshEvent) -> String {
        let services = self.session.services();
        let body = match event.target {
            RefreshTarget::Overview => format!(
                "{}\n{}",
                render::render_stats(&services.tasks.stats().await),
                render::render_task_table(&services.tasks.recent_tasks().await)
            ),
            RefreshTarget::TaskList => format!(
                "{}\n{}",
                render::render_task_table(&services.tasks.current_page().await.items),
                render::render_pagination(&services.tasks.pagination().await)
            ),
            RefreshTarget::ManualExports => render::render_manual_exports(
                &services.manual_exports.records().await,
                &services.manual_exports.pagination().await,
            ),
            RefreshTarget::Configs => {
                render::render_config_entries(&services.configs.entries().await)
            }
            RefreshTarget::Idle => String::new(),
        };

        let view = self.session.view_state().await.active();
        if event.success {
            format!("== {view} ==\n{body}")
        } else {
            format!("== {view} (刷新失败，显示上次数据) ==\n{body}")
        }
    }
}

fn confirmation_for(force: bool) -> Box<dyn Confirmation> {
    if force {
        Box::new(FixedConfirmation(true))
    } else {
        Box::new(StdinConfirmation)
    }
}

fn outcome_to_result(outcome: TriggerOutcome) -> Result<String> {
    if outcome.is_success() {
        Ok(render::render_trigger_outcome(&outcome))
    } else {
        Err(anyhow::anyhow!(render::render_trigger_outcome(&outcome)))
    }
}

fn read_yaml(path: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("读取YAML文件失败: {path}"))
}
