use kel_console_client::ConsoleApiClient;
use kel_console_core::{ConsoleResult, TaskViewConfig};
use kel_console_domain::{Pagination, TaskFilter, TaskPage, TaskStats, TaskSummary};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::confirm::{Confirmation, Deletion};

#[derive(Debug, Clone, Default)]
struct TaskQueryState {
    filter: TaskFilter,
    pagination: Pagination,
    page: TaskPage,
    stats: TaskStats,
    recent: Vec<TaskSummary>,
    overview_days: Option<u32>,
}

/// 任务列表查询、概览统计与删除
pub struct TaskQueryService {
    client: ConsoleApiClient,
    recent_limit: u32,
    state: RwLock<TaskQueryState>,
}

impl TaskQueryService {
    pub fn new(client: ConsoleApiClient, config: &TaskViewConfig, overview_days: Option<u32>) -> Self {
        Self {
            client,
            recent_limit: config.recent_limit,
            state: RwLock::new(TaskQueryState {
                pagination: Pagination::new(config.page_size),
                overview_days,
                ..Default::default()
            }),
        }
    }

    /// 单次查询，不修改持有的列表状态
    pub async fn list_tasks(
        &self,
        filter: &TaskFilter,
        pagination: &Pagination,
    ) -> ConsoleResult<TaskPage> {
        let response = self
            .client
            .list_tasks(filter, pagination, None)
            .await
            .inspect_err(|e| error!("加载任务列表失败: {}", e))?;
        Ok(TaskPage {
            items: response.data,
            total: response.total,
        })
    }

    /// 失败只记录日志，返回 `None` 且保留上一次的统计
    pub async fn load_stats(&self, days: Option<u32>) -> Option<TaskStats> {
        self.fetch_stats(days)
            .await
            .inspect_err(|e| warn!("加载统计信息失败: {}", e))
            .ok()
    }

    /// 最近任务，按创建时间倒序，失败策略同统计
    pub async fn load_recent_tasks(&self, days: Option<u32>) -> Option<Vec<TaskSummary>> {
        self.fetch_recent_tasks(days)
            .await
            .inspect_err(|e| warn!("加载最近任务失败: {}", e))
            .ok()
    }

    /// 并发刷新统计与最近任务；任一失败时返回该错误，已成功的部分照常保存
    pub async fn refresh_overview(&self) -> ConsoleResult<()> {
        let days = self.state.read().await.overview_days;
        let (stats, recent) = tokio::join!(self.fetch_stats(days), self.fetch_recent_tasks(days));
        stats?;
        recent?;
        Ok(())
    }

    async fn fetch_stats(&self, days: Option<u32>) -> ConsoleResult<TaskStats> {
        let stats = self.client.task_stats(days).await?;
        self.state.write().await.stats = stats;
        Ok(stats)
    }

    async fn fetch_recent_tasks(&self, days: Option<u32>) -> ConsoleResult<Vec<TaskSummary>> {
        let response = self.client.recent_tasks(self.recent_limit, days).await?;
        self.state.write().await.recent = response.data.clone();
        Ok(response.data)
    }

    /// 按当前过滤条件与分页重新查询并保存结果
    pub async fn refresh_task_list(&self) -> ConsoleResult<TaskPage> {
        let (filter, pagination) = {
            let state = self.state.read().await;
            (state.filter.clone(), state.pagination)
        };
        let response = self.client.list_tasks(&filter, &pagination, None).await?;
        let page = TaskPage {
            items: response.data,
            total: response.total,
        };

        let mut state = self.state.write().await;
        state.pagination.total = page.total;
        state.page = page.clone();
        debug!("任务列表已刷新: {} 条 / 共 {}", page.items.len(), page.total);
        Ok(page)
    }

    /// 只设置过滤条件并回到第 0 页，不发请求
    pub async fn seed_filter(&self, filter: TaskFilter) {
        let mut state = self.state.write().await;
        state.filter = filter;
        state.pagination.page = 0;
    }

    pub async fn set_filter(&self, filter: TaskFilter) -> ConsoleResult<TaskPage> {
        self.seed_filter(filter).await;
        self.refresh_task_list()
            .await
            .inspect_err(|e| error!("加载任务列表失败: {}", e))
    }

    pub async fn reset_filter(&self) -> ConsoleResult<TaskPage> {
        self.set_filter(TaskFilter::default()).await
    }

    pub async fn change_page(&self, page: u32) -> ConsoleResult<TaskPage> {
        self.state.write().await.pagination.page = page;
        self.refresh_task_list()
            .await
            .inspect_err(|e| error!("加载任务列表失败: {}", e))
    }

    /// 已在最后一页时不发请求，返回 `false`
    pub async fn next_page(&self) -> ConsoleResult<bool> {
        let pagination = self.state.read().await.pagination;
        if !pagination.has_next() {
            return Ok(false);
        }
        self.change_page(pagination.page + 1).await.map(|_| true)
    }

    pub async fn prev_page(&self) -> ConsoleResult<bool> {
        let pagination = self.state.read().await.pagination;
        if !pagination.has_prev() {
            return Ok(false);
        }
        self.change_page(pagination.page - 1).await.map(|_| true)
    }

    pub async fn set_overview_days(&self, days: Option<u32>) {
        self.state.write().await.overview_days = days;
    }

    /// 删除需先确认；成功后重新查询列表，概览页同时刷新统计
    pub async fn delete_task(
        &self,
        id: i64,
        confirmation: &dyn Confirmation,
        on_overview: bool,
    ) -> ConsoleResult<Deletion> {
        if !confirmation.confirm(&format!("确定要删除任务 {id} 吗？")) {
            return Ok(Deletion::Cancelled);
        }

        self.client
            .delete_task(id)
            .await
            .inspect_err(|e| error!("删除任务失败: {}", e))?;
        info!("任务已删除: {}", id);

        if let Err(e) = self.refresh_task_list().await {
            warn!("删除后刷新任务列表失败: {}", e);
        }
        if on_overview {
            if let Err(e) = self.refresh_overview().await {
                warn!("删除后刷新概览失败: {}", e);
            }
        }
        Ok(Deletion::Deleted)
    }

    pub async fn filter(&self) -> TaskFilter {
        self.state.read().await.filter.clone()
    }

    pub async fn pagination(&self) -> Pagination {
        self.state.read().await.pagination
    }

    pub async fn current_page(&self) -> TaskPage {
        self.state.read().await.page.clone()
    }

    pub async fn stats(&self) -> TaskStats {
        self.state.read().await.stats
    }

    pub async fn recent_tasks(&self) -> Vec<TaskSummary> {
        self.state.read().await.recent.clone()
    }

    pub async fn overview_days(&self) -> Option<u32> {
        self.state.read().await.overview_days
    }
}
