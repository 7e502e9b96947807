use std::sync::Arc;
use std::time::Duration;

use kel_console_client::ConsoleApiClient;
use kel_console_core::{ConsoleConfig, ConsoleResult};
use kel_console_domain::TaskFilter;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::confirm::{Confirmation, Deletion};
use crate::polling::{PollingScheduler, RefreshEvent, RefreshHandler};
use crate::router::HashRouter;
use crate::services::ConsoleServices;
use crate::view_state::{FilterSeed, MainView, RefreshTarget, SubView, ViewState, ViewStateMachine};

/// 一次控制台会话
///
/// `mount` 启动定时刷新，`unmount` 或析构时停止。
pub struct ConsoleSession {
    view: Arc<RwLock<ViewStateMachine>>,
    services: Arc<ConsoleServices>,
    scheduler: PollingScheduler,
}

impl ConsoleSession {
    pub fn new(client: ConsoleApiClient, config: &ConsoleConfig) -> Self {
        let view = Arc::new(RwLock::new(ViewStateMachine::new()));
        let services = Arc::new(ConsoleServices::new(client, config));
        let handler: Arc<dyn RefreshHandler> = services.clone();
        let scheduler = PollingScheduler::new(
            Duration::from_secs(config.polling.interval_seconds),
            Arc::clone(&view),
            handler,
        );

        Self {
            view,
            services,
            scheduler,
        }
    }

    pub fn mount(&mut self) {
        info!("控制台会话已挂载");
        self.scheduler.start();
    }

    pub fn unmount(&mut self) {
        self.scheduler.stop();
        info!("控制台会话已卸载");
    }

    pub fn is_mounted(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn services(&self) -> &Arc<ConsoleServices> {
        &self.services
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.scheduler.subscribe()
    }

    pub async fn view_state(&self) -> ViewState {
        self.view.read().await.state()
    }

    /// 启动时解析一次 URL 片段，命中时应用过滤种子但不发请求
    pub async fn apply_route(&self, fragment: &str) -> Option<FilterSeed> {
        let seed = HashRouter::apply(fragment, &mut *self.view.write().await)?;
        self.apply_seed(&seed).await;
        Some(seed)
    }

    pub async fn navigate_to(&self, main: MainView, sub: Option<SubView>) -> ViewState {
        let state = self.view.write().await.navigate_to(main, sub);
        debug!("导航到 {}", state.active());
        state
    }

    /// 跳转并应用过滤种子，随后立即刷新目标视图，刷新错误返回给调用方
    pub async fn navigate_with_filter(
        &self,
        main: MainView,
        sub: Option<SubView>,
        job_code: &str,
    ) -> ConsoleResult<FilterSeed> {
        let seed = self
            .view
            .write()
            .await
            .navigate_with_filter(main, sub, job_code);
        self.apply_seed(&seed).await;
        self.refresh_now().await?;
        Ok(seed)
    }

    /// 前台刷新当前视图
    pub async fn refresh_now(&self) -> ConsoleResult<RefreshTarget> {
        let target = self.view_state().await.refresh_target();
        self.services.refresh(target).await?;
        Ok(target)
    }

    /// 手动触发一次定时刷新逻辑
    pub async fn tick(&self) -> Option<tokio::task::JoinHandle<()>> {
        self.scheduler.tick().await
    }

    pub async fn delete_task(
        &self,
        id: i64,
        confirmation: &dyn Confirmation,
    ) -> ConsoleResult<Deletion> {
        let on_overview = self.view_state().await.is_overview();
        self.services
            .tasks
            .delete_task(id, confirmation, on_overview)
            .await
    }

    async fn apply_seed(&self, seed: &FilterSeed) {
        match seed {
            FilterSeed::TaskList { job_code } => {
                self.services
                    .tasks
                    .seed_filter(TaskFilter::by_job(job_code.clone()))
                    .await
            }
            FilterSeed::Config { config_key } => self.services.configs.focus(config_key).await,
            FilterSeed::Execute { config_key } => {
                self.services.triggers.preselect(config_key).await
            }
        }
    }
}
