use std::sync::Arc;

use kel_console_client::{ConfigKeyScope, ConsoleApiClient};
use kel_console_core::ConsoleResult;
use kel_console_domain::{optional_text, required_text, ConfigKey, TriggerResponse};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::manual_export::ManualExportService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Extract,
    Load,
}

impl TriggerKind {
    pub fn label(&self) -> &'static str {
        match self {
            TriggerKind::Extract => "卸载",
            TriggerKind::Load => "加载",
        }
    }
}

/// 触发参数；只对加载生效
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerParams {
    pub source_batch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableExportIntent {
    pub config_key: String,
    pub table_name: String,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableLoadIntent {
    pub config_key: String,
    pub table_name: String,
    pub source_batch: Option<String>,
}

/// 最近一次触发的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum TriggerOutcome {
    #[serde(rename_all = "camelCase")]
    Started {
        task_id: Option<i64>,
        batch_number: Option<String>,
        message: String,
        manual_export_id: Option<i64>,
    },
    Failed { message: String },
}

impl TriggerOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TriggerOutcome::Started { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            TriggerOutcome::Started { message, .. } | TriggerOutcome::Failed { message } => message,
        }
    }

    fn from_result(result: ConsoleResult<TriggerResponse>, default_message: &str) -> Self {
        match result {
            Ok(response) => TriggerOutcome::Started {
                task_id: response.task_id,
                batch_number: response.batch_number,
                message: response
                    .message
                    .unwrap_or_else(|| default_message.to_string()),
                manual_export_id: response.manual_export_id,
            },
            Err(e) => TriggerOutcome::Failed { message: e.message() },
        }
    }
}

/// 作业与表级触发
///
/// 只保留一个结果，后到的覆盖先到的。
/// 作业级触发不刷新任何列表；表级触发成功后刷新手工导出历史。
pub struct JobTriggerService {
    client: ConsoleApiClient,
    manual_exports: Arc<ManualExportService>,
    last_result: RwLock<Option<TriggerOutcome>>,
    preselected: RwLock<Option<String>>,
}

impl JobTriggerService {
    pub fn new(client: ConsoleApiClient, manual_exports: Arc<ManualExportService>) -> Self {
        Self {
            client,
            manual_exports,
            last_result: RwLock::new(None),
            preselected: RwLock::new(None),
        }
    }

    /// 只有校验错误以 `Err` 返回；远端失败记录为 `TriggerOutcome::Failed`
    pub async fn trigger(
        &self,
        config_key: &str,
        kind: TriggerKind,
        params: Option<TriggerParams>,
    ) -> ConsoleResult<TriggerOutcome> {
        let key = ConfigKey::parse("configKey", config_key)?;
        let result = match kind {
            TriggerKind::Extract => self.client.trigger_extract(&key).await,
            TriggerKind::Load => {
                let source_batch =
                    params.and_then(|p| optional_text(p.source_batch.as_deref()));
                self.client
                    .trigger_load(&key, source_batch.as_deref())
                    .await
            }
        };

        let outcome = TriggerOutcome::from_result(result, "作业已启动");
        Ok(self
            .record(&format!("{}作业 {}", kind.label(), key), outcome)
            .await)
    }

    pub async fn trigger_table_export(
        &self,
        intent: TableExportIntent,
    ) -> ConsoleResult<TriggerOutcome> {
        let key = ConfigKey::parse("configKey", &intent.config_key)?;
        let table = required_text("tableName", &intent.table_name, "请选择表名")?;
        let mode = optional_text(intent.mode.as_deref());

        let result = self
            .client
            .trigger_table_export(&key, &table, mode.as_deref())
            .await;
        let outcome = TriggerOutcome::from_result(result, "表级卸载已触发");
        let outcome = self
            .record(&format!("表级卸载 {key}/{table}"), outcome)
            .await;
        self.refresh_history_on_success(&outcome).await;
        Ok(outcome)
    }

    pub async fn trigger_table_load(
        &self,
        intent: TableLoadIntent,
    ) -> ConsoleResult<TriggerOutcome> {
        let key = ConfigKey::parse("configKey", &intent.config_key)?;
        let table = required_text("tableName", &intent.table_name, "请选择表名")?;
        let source_batch = optional_text(intent.source_batch.as_deref());

        let result = self
            .client
            .trigger_table_load(&key, &table, source_batch.as_deref())
            .await;
        let outcome = TriggerOutcome::from_result(result, "表级加载已触发");
        let outcome = self
            .record(&format!("表级加载 {key}/{table}"), outcome)
            .await;
        self.refresh_history_on_success(&outcome).await;
        Ok(outcome)
    }

    pub async fn list_config_keys(&self, scope: ConfigKeyScope) -> ConsoleResult<Vec<String>> {
        self.client
            .config_keys(scope)
            .await
            .inspect_err(|e| error!("加载配置键列表失败: {}", e))
    }

    pub async fn list_tables(&self, config_key: &str) -> ConsoleResult<Vec<String>> {
        let key = ConfigKey::parse("configKey", config_key)?;
        self.client
            .list_tables(&key)
            .await
            .inspect_err(|e| error!("加载表列表失败: {}", e))
    }

    pub async fn last_result(&self) -> Option<TriggerOutcome> {
        self.last_result.read().await.clone()
    }

    /// 执行表单预填的配置键
    pub async fn preselect(&self, config_key: &str) {
        let key = config_key.trim();
        *self.preselected.write().await = (!key.is_empty()).then(|| key.to_string());
    }

    pub async fn preselected(&self) -> Option<String> {
        self.preselected.read().await.clone()
    }

    pub async fn clear_result(&self) {
        *self.last_result.write().await = None;
    }

    async fn record(&self, what: &str, outcome: TriggerOutcome) -> TriggerOutcome {
        match &outcome {
            TriggerOutcome::Started { task_id, .. } => {
                info!("{} 已触发, 任务ID: {:?}", what, task_id)
            }
            TriggerOutcome::Failed { message } => error!("{} 触发失败: {}", what, message),
        }
        *self.last_result.write().await = Some(outcome.clone());
        outcome
    }

    async fn refresh_history_on_success(&self, outcome: &TriggerOutcome) {
        if !outcome.is_success() {
            return;
        }
        if let Err(e) = self.manual_exports.refresh().await {
            warn!("刷新手工导出历史失败: {}", e);
        }
    }
}
