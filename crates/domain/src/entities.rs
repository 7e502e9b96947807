use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::formatters::{parse_execution_log, ExecutionLogEntry};
use crate::timestamps;

/// 显式的 `null` 与缺失字段同样取默认值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 任务执行状态
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "CANCELLED")]
    Cancelled,
    /// 服务端新增的状态值，按未知处理
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Running,
        TaskStatus::Success,
        TaskStatus::Failed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Running => "RUNNING",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Cancelled => "CANCELLED",
            TaskStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Running => "运行中",
            TaskStatus::Success => "成功",
            TaskStatus::Failed => "失败",
            TaskStatus::Cancelled => "已取消",
            TaskStatus::Unknown => "未知",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Success | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => Ok(TaskStatus::Running),
            "SUCCESS" => Ok(TaskStatus::Success),
            "FAILED" => Ok(TaskStatus::Failed),
            "CANCELLED" => Ok(TaskStatus::Cancelled),
            other => Err(format!("未知的任务状态: {other}")),
        }
    }
}

/// 一次作业执行记录，来自 `/api/tasks` 与 `/api/tasks/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    #[serde(alias = "taskId")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_code: String,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub node_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub current_stage: Option<String>,
    #[serde(default, alias = "message")]
    pub error_message: Option<String>,
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default, alias = "duration")]
    pub duration_seconds: Option<i64>,
    #[serde(
        default,
        alias = "createTime",
        deserialize_with = "timestamps::deserialize_option"
    )]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    pub updated_at: Option<NaiveDateTime>,
    /// 触发时的配置快照（YAML 文本）
    #[serde(default)]
    pub config_snapshot: Option<String>,
    /// 原始统计 JSON 文本
    #[serde(default)]
    pub statistics: Option<String>,
    /// 执行日志，JSON 数组文本
    #[serde(default)]
    pub execution_log: Option<String>,
}

impl TaskSummary {
    /// 服务端给出的耗时优先，否则由起止时间推算；仍在运行的任务返回 `None`
    pub fn duration_seconds(&self) -> Option<i64> {
        if let Some(seconds) = self.duration_seconds {
            return Some(seconds);
        }
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_seconds()),
            _ => None,
        }
    }

    pub fn execution_log(&self) -> Vec<ExecutionLogEntry> {
        parse_execution_log(self.execution_log.as_deref())
    }
}

/// 任务状态汇总
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub running: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed: u64,
}

/// 任务实时进度
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgress {
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default, alias = "percent")]
    pub progress: Option<f64>,
    #[serde(default)]
    pub current_stage: Option<String>,
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    #[serde(default)]
    pub estimated_remaining_seconds: Option<i64>,
    #[serde(default)]
    pub processed: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl TaskProgress {
    /// 百分比，限制在 0 到 100 之间
    pub fn percent(&self) -> f64 {
        let raw = match (self.progress, self.processed, self.total) {
            (Some(percent), _, _) => percent,
            (None, Some(done), Some(total)) if total > 0 => done as f64 * 100.0 / total as f64,
            _ => 0.0,
        };
        raw.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StageMetrics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage_name: String,
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// 任务执行统计
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatistics {
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub table_row_counts: BTreeMap<String, i64>,
    #[serde(default)]
    pub total_tables: Option<u32>,
    #[serde(default)]
    pub total_rows: Option<i64>,
    #[serde(default)]
    pub total_file_size: Option<i64>,
    #[serde(default)]
    pub total_files: Option<u32>,
    #[serde(default)]
    pub original_size: Option<i64>,
    #[serde(default)]
    pub compressed_size: Option<i64>,
    #[serde(default)]
    pub compression_ratio: Option<f64>,
    #[serde(default)]
    pub split_count: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub split_files: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage_metrics: Vec<StageMetrics>,
    #[serde(default)]
    pub total_duration_ms: Option<i64>,
    #[serde(default)]
    pub encrypted: Option<bool>,
    #[serde(default)]
    pub encryption_duration_ms: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ManifestCompression {
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub split_threshold_gb: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ManifestEncryption {
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(default)]
    pub algorithm: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ManifestFile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub sm3: Option<String>,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub row_count: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ManifestSplit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub sm3: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
}

/// 任务产物清单（manifest.json）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ManifestMetadata {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub job_name: Option<String>,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub compression: Option<ManifestCompression>,
    #[serde(default)]
    pub encryption: Option<ManifestEncryption>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<ManifestFile>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub splits: Vec<ManifestSplit>,
}

impl ManifestMetadata {
    pub fn total_file_size(&self) -> i64 {
        self.files.iter().filter_map(|f| f.size).sum()
    }
}

/// 作业配置条目
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub config_key: String,
    #[serde(default)]
    pub content_yaml: Option<String>,
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigContent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_yaml: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ManualExportKind {
    #[serde(rename = "EXPORT")]
    #[default]
    Export,
    #[serde(rename = "LOAD")]
    Load,
}

impl ManualExportKind {
    pub fn label(&self) -> &'static str {
        match self {
            ManualExportKind::Export => "表卸载",
            ManualExportKind::Load => "表加载",
        }
    }
}

/// 手工表级卸载/加载记录
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManualExportRecord {
    pub id: i64,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: ManualExportKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub table_name: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub source_batch: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default, deserialize_with = "timestamps::deserialize_option")]
    pub requested_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub requested_by: Option<String>,
}

/// 触发接口的成功响应
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub manual_export_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

/// 磁盘空间检查结果
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiskSpaceInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_space_gb: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub usable_space_gb: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used_space_gb: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub usable_percentage: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used_percentage: f64,
    /// 服务端以 200 返回的错误说明
    #[serde(default)]
    pub error: Option<String>,
}

/// 列表接口的统一外形 `{data: [...], total: N}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_summary_from_api_json() {
        let task: TaskSummary = serde_json::from_value(json!({
            "id": 42,
            "jobCode": "daily_orders",
            "batchNumber": "20240301_001",
            "status": "SUCCESS",
            "startTime": "2024-03-01T08:00:00",
            "endTime": "2024-03-01T09:01:01.500",
            "executionLog": null
        }))
        .unwrap();

        assert_eq!(task.id, 42);
        assert_eq!(task.status, TaskStatus::Success);
        assert_eq!(task.duration_seconds(), Some(3661));
        assert!(task.execution_log().is_empty());
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let task: TaskSummary =
            serde_json::from_value(json!({"id": 1, "status": "PAUSED"})).unwrap();
        assert_eq!(task.status, TaskStatus::Unknown);
        assert_eq!(task.duration_seconds(), None);
    }

    #[test]
    fn test_server_duration_wins() {
        let task: TaskSummary = serde_json::from_value(json!({
            "id": 1,
            "status": "RUNNING",
            "startTime": "2024-03-01T08:00:00",
            "durationSeconds": 12
        }))
        .unwrap();
        assert_eq!(task.duration_seconds(), Some(12));
    }

    #[test]
    fn test_progress_percent() {
        let progress = TaskProgress {
            processed: Some(30),
            total: Some(120),
            ..Default::default()
        };
        assert_eq!(progress.percent(), 25.0);

        let over: TaskProgress = serde_json::from_value(json!({"percent": 140.0})).unwrap();
        assert_eq!(over.percent(), 100.0);
        assert_eq!(TaskProgress::default().percent(), 0.0);
    }

    #[test]
    fn test_manual_export_record() {
        let record: ManualExportRecord = serde_json::from_value(json!({
            "id": 7,
            "type": "LOAD",
            "jobCode": "orders",
            "tableName": "t_order",
            "sourceBatch": "20240301_001",
            "requestedAt": [2024, 3, 1, 10, 0, 0]
        }))
        .unwrap();
        assert_eq!(record.kind, ManualExportKind::Load);
        assert!(record.requested_at.is_some());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("running".parse::<TaskStatus>(), Ok(TaskStatus::Running));
        assert!("paused".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_explicit_nulls_fall_back_to_defaults() {
        let manifest: ManifestMetadata = serde_json::from_value(json!({
            "version": "1.0",
            "job_name": "daily_orders",
            "files": [{"name": null, "size": 10}],
            "splits": null,
            "encryption": {"enabled": null, "algorithm": null}
        }))
        .unwrap();
        assert!(manifest.splits.is_empty());
        assert_eq!(manifest.files[0].name, "");
        assert!(!manifest.encryption.unwrap().enabled);

        let statistics: TaskStatistics = serde_json::from_value(json!({
            "tableRowCounts": null,
            "splitFiles": null,
            "stageMetrics": [{"stageName": null, "durationMs": 5}]
        }))
        .unwrap();
        assert!(statistics.table_row_counts.is_empty());
        assert_eq!(statistics.stage_metrics[0].duration_ms, Some(5));

        let task: TaskSummary =
            serde_json::from_value(json!({"id": 1, "jobCode": null, "status": null})).unwrap();
        assert_eq!(task.status, TaskStatus::Unknown);
    }
}
