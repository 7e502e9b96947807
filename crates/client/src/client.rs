use std::sync::Arc;

use kel_console_core::{ApiConfig, ConsoleError, ConsoleResult, GENERIC_FAILURE_MESSAGE};
use kel_console_domain::{
    ConfigContent, ConfigKey, DiskSpaceInfo, JobConfigEntry, ListResponse, ManifestMetadata,
    ManualExportRecord, MessageResponse, Pagination, TaskFilter, TaskProgress, TaskQueryBuilder,
    TaskStatistics, TaskStats, TaskSummary, TriggerResponse,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::request::{ApiRequest, ApiResponse};
use crate::transport::{HttpTransport, ReqwestTransport};

/// 配置键列表的范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigKeyScope {
    #[default]
    All,
    TableExport,
    TableLoad,
}

impl ConfigKeyScope {
    fn segments(&self) -> Vec<&'static str> {
        match self {
            ConfigKeyScope::All => vec!["api", "jobs", "config-keys"],
            ConfigKeyScope::TableExport => vec!["api", "jobs", "config-keys", "table-export"],
            ConfigKeyScope::TableLoad => vec!["api", "jobs", "config-keys", "table-load"],
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// 作业平台 REST API 客户端
///
/// 每个方法对应一个远端接口。非 2xx 响应统一转换为
/// `ConsoleError::Api { status, message }`，message 优先取响应体中的 `error` 字段。
#[derive(Clone)]
pub struct ConsoleApiClient {
    transport: Arc<dyn HttpTransport>,
}

impl ConsoleApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub fn from_config(config: &ApiConfig) -> ConsoleResult<Self> {
        Ok(Self::new(Arc::new(ReqwestTransport::new(config)?)))
    }

    // ---- 任务 ----

    pub async fn task_stats(&self, days: Option<u32>) -> ConsoleResult<TaskStats> {
        let request = ApiRequest::get(["api", "tasks", "stats"])
            .with_query_pairs(TaskQueryBuilder::build_stats_params(days));
        self.fetch(request).await
    }

    pub async fn list_tasks(
        &self,
        filter: &TaskFilter,
        pagination: &Pagination,
        days: Option<u32>,
    ) -> ConsoleResult<ListResponse<TaskSummary>> {
        let request = ApiRequest::get(["api", "tasks"]).with_query_pairs(
            TaskQueryBuilder::build_list_params(filter, pagination, days),
        );
        self.fetch(request).await
    }

    pub async fn recent_tasks(
        &self,
        limit: u32,
        days: Option<u32>,
    ) -> ConsoleResult<ListResponse<TaskSummary>> {
        let request = ApiRequest::get(["api", "tasks"])
            .with_query_pairs(TaskQueryBuilder::build_recent_params(limit, days));
        self.fetch(request).await
    }

    pub async fn get_task(&self, id: i64) -> ConsoleResult<TaskSummary> {
        self.fetch(ApiRequest::get(["api".to_string(), "tasks".to_string(), id.to_string()]))
            .await
    }

    pub async fn task_progress(&self, id: i64) -> ConsoleResult<Option<TaskProgress>> {
        self.fetch_optional(task_resource(id, "progress")).await
    }

    pub async fn task_statistics(&self, id: i64) -> ConsoleResult<Option<TaskStatistics>> {
        self.fetch_optional(task_resource(id, "statistics")).await
    }

    pub async fn task_manifest(&self, id: i64) -> ConsoleResult<Option<ManifestMetadata>> {
        self.fetch_optional(task_resource(id, "manifest")).await
    }

    pub async fn delete_task(&self, id: i64) -> ConsoleResult<()> {
        self.execute(ApiRequest::delete([
            "api".to_string(),
            "tasks".to_string(),
            id.to_string(),
        ]))
        .await
        .map(|_| ())
    }

    // ---- 作业触发 ----

    pub async fn trigger_extract(&self, key: &ConfigKey) -> ConsoleResult<TriggerResponse> {
        self.fetch(ApiRequest::post(job_segments(key, &["extract"])))
            .await
    }

    pub async fn trigger_load(
        &self,
        key: &ConfigKey,
        source_batch: Option<&str>,
    ) -> ConsoleResult<TriggerResponse> {
        let mut request = ApiRequest::post(job_segments(key, &["load"]));
        if let Some(batch) = source_batch {
            request = request.with_query("sourceBatch", batch);
        }
        self.fetch(request).await
    }

    pub async fn config_keys(&self, scope: ConfigKeyScope) -> ConsoleResult<Vec<String>> {
        self.fetch(ApiRequest::get(scope.segments())).await
    }

    pub async fn list_tables(&self, key: &ConfigKey) -> ConsoleResult<Vec<String>> {
        self.fetch(ApiRequest::get(job_segments(key, &["tables"])))
            .await
    }

    pub async fn trigger_table_export(
        &self,
        key: &ConfigKey,
        table: &str,
        mode: Option<&str>,
    ) -> ConsoleResult<TriggerResponse> {
        let mut request = ApiRequest::post(job_segments(key, &["tables", table, "export"]));
        if let Some(mode) = mode {
            request = request.with_query("mode", mode);
        }
        self.fetch(request).await
    }

    pub async fn trigger_table_load(
        &self,
        key: &ConfigKey,
        table: &str,
        source_batch: Option<&str>,
    ) -> ConsoleResult<TriggerResponse> {
        let mut request = ApiRequest::post(job_segments(key, &["tables", table, "load"]));
        if let Some(batch) = source_batch {
            request = request.with_query("sourceBatch", batch);
        }
        self.fetch(request).await
    }

    pub async fn manual_exports(
        &self,
        page: u32,
        size: u32,
    ) -> ConsoleResult<ListResponse<ManualExportRecord>> {
        let request = ApiRequest::get(["api", "manual-exports"])
            .with_query("page", page.to_string())
            .with_query("size", size.to_string());
        self.fetch(request).await
    }

    // ---- 作业配置 ----

    pub async fn list_configs(&self) -> ConsoleResult<Vec<JobConfigEntry>> {
        self.fetch(ApiRequest::get(["api", "jobs", "configs"])).await
    }

    pub async fn read_config(&self, key: &ConfigKey) -> ConsoleResult<String> {
        let content: ConfigContent = self.fetch(ApiRequest::get(config_segments(key))).await?;
        Ok(content.content_yaml)
    }

    /// 配置键为空时由服务端根据 YAML 中的 `job.name` 生成
    pub async fn create_config(
        &self,
        key: Option<&ConfigKey>,
        content_yaml: &str,
    ) -> ConsoleResult<()> {
        let body = json!({
            "configKey": key.map(ConfigKey::as_str).unwrap_or(""),
            "contentYaml": content_yaml,
        });
        self.execute(ApiRequest::post(["api", "jobs", "configs"]).with_body(body))
            .await
            .map(|_| ())
    }

    pub async fn update_config(&self, key: &ConfigKey, content_yaml: &str) -> ConsoleResult<()> {
        let body = json!({ "contentYaml": content_yaml });
        self.execute(ApiRequest::put(config_segments(key)).with_body(body))
            .await
            .map(|_| ())
    }

    pub async fn delete_config(&self, key: &ConfigKey) -> ConsoleResult<()> {
        self.execute(ApiRequest::delete(config_segments(key)))
            .await
            .map(|_| ())
    }

    pub async fn import_configs(&self) -> ConsoleResult<MessageResponse> {
        self.fetch(ApiRequest::post(["api", "jobs", "admin", "import-config"]))
            .await
    }

    /// 配置说明文档，原样返回 Markdown 文本
    pub async fn spec_document(&self) -> ConsoleResult<String> {
        self.execute(ApiRequest::get(["config-spec.md"]))
            .await
            .map(|response| response.body)
    }

    // ---- 系统 ----

    pub async fn disk_space(&self, path: &str) -> ConsoleResult<DiskSpaceInfo> {
        let request = ApiRequest::get(["api", "system", "disk-space"]).with_query("path", path);
        let info: DiskSpaceInfo = self.fetch(request).await?;
        if let Some(error) = info.error.as_deref().filter(|e| !e.trim().is_empty()) {
            return Err(ConsoleError::http(200, error));
        }
        Ok(info)
    }

    // ---- 内部辅助 ----

    async fn execute(&self, request: ApiRequest) -> ConsoleResult<ApiResponse> {
        let label = request.to_string();
        let response = self.transport.send(request).await?;
        if response.is_success() {
            debug!("{} -> {}", label, response.status);
            Ok(response)
        } else {
            let err = normalize_error(&response);
            warn!("{} -> {}: {}", label, response.status, err);
            Err(err)
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> ConsoleResult<T> {
        let response = self.execute(request).await?;
        decode(&response)
    }

    /// 404 视为数据不存在
    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> ConsoleResult<Option<T>> {
        let label = request.to_string();
        let response = self.transport.send(request).await?;
        if response.is_not_found() {
            debug!("{} -> 404，按无数据处理", label);
            return Ok(None);
        }
        if !response.is_success() {
            return Err(normalize_error(&response));
        }
        decode(&response).map(Some)
    }
}

fn task_resource(id: i64, resource: &str) -> ApiRequest {
    ApiRequest::get([
        "api".to_string(),
        "tasks".to_string(),
        id.to_string(),
        resource.to_string(),
    ])
}

fn job_segments(key: &ConfigKey, rest: &[&str]) -> Vec<String> {
    let mut segments = vec!["api".to_string(), "jobs".to_string(), key.to_string()];
    segments.extend(rest.iter().map(|s| s.to_string()));
    segments
}

fn config_segments(key: &ConfigKey) -> Vec<String> {
    vec![
        "api".to_string(),
        "jobs".to_string(),
        "configs".to_string(),
        key.to_string(),
    ]
}

fn decode<T: DeserializeOwned>(response: &ApiResponse) -> ConsoleResult<T> {
    serde_json::from_str(&response.body).map_err(|e| ConsoleError::decode(e.to_string()))
}

/// 非 2xx 响应归一化为 `{status, message}`
pub fn normalize_error(response: &ApiResponse) -> ConsoleError {
    let server_message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.trim().is_empty());

    match server_message {
        Some(message) => ConsoleError::http(response.status, message),
        None => ConsoleError::http(
            response.status,
            format!("{GENERIC_FAILURE_MESSAGE} (HTTP {})", response.status),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_error_prefers_error_field() {
        let err = normalize_error(&ApiResponse::new(400, r#"{"error":"作业配置不存在: x"}"#));
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.message(), "作业配置不存在: x");
    }

    #[test]
    fn test_normalize_error_falls_back_to_generic() {
        let err = normalize_error(&ApiResponse::new(502, "<html>Bad Gateway</html>"));
        assert_eq!(err.message(), "请求失败 (HTTP 502)");

        let err = normalize_error(&ApiResponse::new(500, r#"{"error":""}"#));
        assert_eq!(err.message(), "请求失败 (HTTP 500)");
    }

    #[test]
    fn test_scope_segments() {
        assert_eq!(
            ConfigKeyScope::TableLoad.segments().join("/"),
            "api/jobs/config-keys/table-load"
        );
    }
}
