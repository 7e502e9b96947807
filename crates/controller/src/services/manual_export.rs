use kel_console_client::ConsoleApiClient;
use kel_console_core::ConsoleResult;
use kel_console_domain::{ManualExportRecord, Pagination};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Default)]
struct HistoryState {
    records: Vec<ManualExportRecord>,
    pagination: Pagination,
}

/// 手工表级卸载/加载历史
pub struct ManualExportService {
    client: ConsoleApiClient,
    state: RwLock<HistoryState>,
}

impl ManualExportService {
    pub fn new(client: ConsoleApiClient, page_size: u32) -> Self {
        Self {
            client,
            state: RwLock::new(HistoryState {
                records: Vec::new(),
                pagination: Pagination::new(page_size),
            }),
        }
    }

    pub async fn refresh(&self) -> ConsoleResult<Vec<ManualExportRecord>> {
        let pagination = self.state.read().await.pagination;
        let response = self
            .client
            .manual_exports(pagination.page, pagination.size)
            .await?;

        let mut state = self.state.write().await;
        state.pagination.total = response.total;
        state.records = response.data.clone();
        debug!("手工导出历史已刷新: {} 条", response.data.len());
        Ok(response.data)
    }

    pub async fn change_page(&self, page: u32) -> ConsoleResult<Vec<ManualExportRecord>> {
        self.state.write().await.pagination.page = page;
        self.refresh().await
    }

    pub async fn records(&self) -> Vec<ManualExportRecord> {
        self.state.read().await.records.clone()
    }

    pub async fn pagination(&self) -> Pagination {
        self.state.read().await.pagination
    }
}
