use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kel_console_core::ConsoleResult;
use metrics::counter;
use tokio::sync::{broadcast, oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::view_state::{RefreshTarget, ViewStateMachine};

/// 按刷新目标执行一次刷新
#[async_trait]
pub trait RefreshHandler: Send + Sync {
    async fn refresh(&self, target: RefreshTarget) -> ConsoleResult<()>;
}

/// 一次后台刷新结束后发出的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshEvent {
    pub target: RefreshTarget,
    pub success: bool,
}

/// 定时刷新调度器
///
/// 每次触发时读取当前视图决定刷新内容，刷新任务独立派生，
/// 慢请求或失败不会阻塞下一次触发。后台失败只记录日志与计数。
pub struct PollingScheduler {
    interval: Duration,
    view: Arc<RwLock<ViewStateMachine>>,
    handler: Arc<dyn RefreshHandler>,
    events: broadcast::Sender<RefreshEvent>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    timer_handle: Option<JoinHandle<()>>,
}

impl PollingScheduler {
    pub fn new(
        interval: Duration,
        view: Arc<RwLock<ViewStateMachine>>,
        handler: Arc<dyn RefreshHandler>,
    ) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            interval,
            view,
            handler,
            events,
            shutdown_tx: None,
            timer_handle: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.timer_handle.is_some()
    }

    /// 启动定时器；已启动时不做任何事
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("Polling scheduler already running");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let period = self.interval;
        let view = Arc::clone(&self.view);
        let handler = Arc::clone(&self.handler);
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            let mut refresh_interval = interval(period);

            loop {
                tokio::select! {
                    _ = refresh_interval.tick() => {
                        let _ = Self::dispatch(&view, &handler, &events).await;
                    }
                    _ = &mut shutdown_rx => {
                        info!("Polling scheduler shutdown requested");
                        break;
                    }
                }
            }
        });

        self.timer_handle = Some(handle);
        info!("Polling scheduler started, interval {:?}", period);
    }

    /// 停止定时器；已派生的刷新任务不取消
    pub fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.timer_handle.take() {
            handle.abort();
            info!("Polling scheduler stopped");
        }
    }

    /// 手动触发一次，返回派生的刷新任务；空闲视图不派生任务
    pub async fn tick(&self) -> Option<JoinHandle<()>> {
        Self::dispatch(&self.view, &self.handler, &self.events).await
    }

    async fn dispatch(
        view: &Arc<RwLock<ViewStateMachine>>,
        handler: &Arc<dyn RefreshHandler>,
        events: &broadcast::Sender<RefreshEvent>,
    ) -> Option<JoinHandle<()>> {
        let target = view.read().await.state().refresh_target();
        if target == RefreshTarget::Idle {
            debug!("Idle tick, nothing to refresh");
            return None;
        }

        let handler = Arc::clone(handler);
        let events = events.clone();
        Some(tokio::spawn(async move {
            let success = match handler.refresh(target).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("后台刷新失败 [{}]: {}", target, e);
                    counter!(
                        "console_background_refresh_failures_total",
                        "target" => target.as_str()
                    )
                    .increment(1);
                    false
                }
            };
            let _ = events.send(RefreshEvent { target, success });
        }))
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
