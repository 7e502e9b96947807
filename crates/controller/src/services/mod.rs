pub mod disk_space;
pub mod job_config;
pub mod job_trigger;
pub mod manual_export;
pub mod task_detail;
pub mod task_query;

use std::sync::Arc;

use async_trait::async_trait;
use kel_console_client::ConsoleApiClient;
use kel_console_core::{ConsoleConfig, ConsoleResult};

pub use disk_space::{DiskReport, DiskSpaceProbe};
pub use job_config::{ConfigEditor, EditorMode, JobConfigService};
pub use job_trigger::{
    JobTriggerService, TableExportIntent, TableLoadIntent, TriggerKind, TriggerOutcome,
    TriggerParams,
};
pub use manual_export::ManualExportService;
pub use task_detail::{ManifestView, TaskDetail, TaskDetailAggregator};
pub use task_query::TaskQueryService;

use crate::polling::RefreshHandler;
use crate::view_state::RefreshTarget;

/// 会话内共享的全部服务
pub struct ConsoleServices {
    pub tasks: Arc<TaskQueryService>,
    pub details: Arc<TaskDetailAggregator>,
    pub triggers: Arc<JobTriggerService>,
    pub manual_exports: Arc<ManualExportService>,
    pub configs: Arc<JobConfigService>,
    pub disk: Arc<DiskSpaceProbe>,
}

impl ConsoleServices {
    pub fn new(client: ConsoleApiClient, config: &ConsoleConfig) -> Self {
        let manual_exports = Arc::new(ManualExportService::new(
            client.clone(),
            config.tasks.page_size,
        ));
        Self {
            tasks: Arc::new(TaskQueryService::new(
                client.clone(),
                &config.tasks,
                config.polling.overview_days,
            )),
            details: Arc::new(TaskDetailAggregator::new(client.clone())),
            triggers: Arc::new(JobTriggerService::new(
                client.clone(),
                Arc::clone(&manual_exports),
            )),
            manual_exports,
            configs: Arc::new(JobConfigService::new(client.clone())),
            disk: Arc::new(DiskSpaceProbe::new(client, config.disk.default_path.clone())),
        }
    }
}

#[async_trait]
impl RefreshHandler for ConsoleServices {
    async fn refresh(&self, target: RefreshTarget) -> ConsoleResult<()> {
        match target {
            RefreshTarget::Overview => self.tasks.refresh_overview().await,
            RefreshTarget::TaskList => self.tasks.refresh_task_list().await.map(|_| ()),
            RefreshTarget::ManualExports => self.manual_exports.refresh().await.map(|_| ()),
            RefreshTarget::Configs => self.configs.list_detailed().await.map(|_| ()),
            RefreshTarget::Idle => Ok(()),
        }
    }
}
