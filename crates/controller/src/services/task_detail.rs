use kel_console_client::ConsoleApiClient;
use kel_console_core::ConsoleResult;
use kel_console_domain::{
    ExecutionLogEntry, ManifestMetadata, TaskProgress, TaskStatistics, TaskSummary,
};
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

/// 详情视图：任务本身加上可能不存在的进度与统计
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDetail {
    pub task: TaskSummary,
    pub progress: Option<TaskProgress>,
    pub statistics: Option<TaskStatistics>,
}

impl TaskDetail {
    pub fn execution_log(&self) -> Vec<ExecutionLogEntry> {
        self.task.execution_log()
    }
}

/// 清单视图；`manifest` 为空表示清单尚未生成
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestView {
    pub task_id: i64,
    pub manifest: Option<ManifestMetadata>,
}

#[derive(Debug, Default)]
struct DetailState {
    task: Option<TaskSummary>,
    progress: Option<TaskProgress>,
    statistics: Option<TaskStatistics>,
}

pub struct TaskDetailAggregator {
    client: ConsoleApiClient,
    detail: RwLock<DetailState>,
    manifest: RwLock<Option<ManifestView>>,
}

impl TaskDetailAggregator {
    pub fn new(client: ConsoleApiClient) -> Self {
        Self {
            client,
            detail: RwLock::new(DetailState::default()),
            manifest: RwLock::new(None),
        }
    }

    /// 任务本身必须取到；进度与统计并行获取，任一失败都按无数据处理
    pub async fn open_detail(&self, id: i64) -> ConsoleResult<TaskDetail> {
        *self.detail.write().await = DetailState::default();

        let task = self
            .client
            .get_task(id)
            .await
            .inspect_err(|e| error!("加载任务详情失败: {}", e))?;

        let (progress, statistics) =
            tokio::join!(self.client.task_progress(id), self.client.task_statistics(id));
        let progress = absent_on_error("进度", id, progress);
        let statistics = absent_on_error("统计", id, statistics);

        let mut state = self.detail.write().await;
        state.task = Some(task.clone());
        state.progress = progress.clone();
        state.statistics = statistics.clone();

        Ok(TaskDetail {
            task,
            progress,
            statistics,
        })
    }

    pub async fn open_manifest(&self, id: i64) -> ConsoleResult<ManifestView> {
        *self.manifest.write().await = None;

        let manifest = self
            .client
            .task_manifest(id)
            .await
            .inspect_err(|e| error!("加载清单失败: {}", e))?;
        if manifest.is_none() {
            debug!("任务 {} 尚未生成清单", id);
        }

        let view = ManifestView {
            task_id: id,
            manifest,
        };
        *self.manifest.write().await = Some(view.clone());
        Ok(view)
    }

    pub async fn close_detail(&self) {
        *self.detail.write().await = DetailState::default();
    }

    pub async fn close_manifest(&self) {
        *self.manifest.write().await = None;
    }

    pub async fn current_detail(&self) -> Option<TaskDetail> {
        let state = self.detail.read().await;
        state.task.clone().map(|task| TaskDetail {
            task,
            progress: state.progress.clone(),
            statistics: state.statistics.clone(),
        })
    }

    pub async fn current_progress(&self) -> Option<TaskProgress> {
        self.detail.read().await.progress.clone()
    }

    pub async fn current_statistics(&self) -> Option<TaskStatistics> {
        self.detail.read().await.statistics.clone()
    }

    pub async fn current_manifest(&self) -> Option<ManifestView> {
        self.manifest.read().await.clone()
    }
}

fn absent_on_error<T>(what: &str, id: i64, result: ConsoleResult<Option<T>>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("任务 {} 的{}信息获取失败，按无数据处理: {}", id, what, e);
            None
        }
    }
}
