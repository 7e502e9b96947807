use kel_console_client::ConsoleApiClient;
use kel_console_core::ConsoleResult;
use kel_console_domain::{required_text, DiskSpaceInfo, DiskUsageLevel};
use tokio::sync::RwLock;
use tracing::error;

#[derive(Debug, Clone, PartialEq)]
pub struct DiskReport {
    pub info: DiskSpaceInfo,
    pub level: DiskUsageLevel,
}

pub struct DiskSpaceProbe {
    client: ConsoleApiClient,
    default_path: String,
    last: RwLock<Option<DiskReport>>,
}

impl DiskSpaceProbe {
    pub fn new(client: ConsoleApiClient, default_path: String) -> Self {
        Self {
            client,
            default_path,
            last: RwLock::new(None),
        }
    }

    pub fn default_path(&self) -> &str {
        &self.default_path
    }

    pub async fn check(&self, path: &str) -> ConsoleResult<DiskReport> {
        let path = required_text("path", path, "请输入要检查的路径")?;
        let info = self
            .client
            .disk_space(&path)
            .await
            .inspect_err(|e| error!("检查磁盘空间失败: {}", e))?;

        let report = DiskReport {
            level: DiskUsageLevel::classify(info.used_percentage),
            info,
        };
        *self.last.write().await = Some(report.clone());
        Ok(report)
    }

    pub async fn last_report(&self) -> Option<DiskReport> {
        self.last.read().await.clone()
    }
}
