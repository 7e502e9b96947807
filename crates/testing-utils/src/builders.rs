//! Test data builders for creating console view models
//!
//! 默认值对应一个已成功结束的卸载任务。

use chrono::{NaiveDate, NaiveDateTime};
use kel_console_domain::{JobConfigEntry, ManualExportKind, ManualExportRecord, TaskStatus, TaskSummary};
use serde_json::{json, Value};

fn fixed_time(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .expect("valid fixture time")
}

/// Builder for creating test TaskSummary entities
pub struct TaskSummaryBuilder {
    task: TaskSummary,
}

impl TaskSummaryBuilder {
    pub fn new() -> Self {
        Self {
            task: TaskSummary {
                id: 1,
                job_code: "daily_orders".to_string(),
                batch_number: Some("20240301_001".to_string()),
                node_name: Some("kel-node-1".to_string()),
                status: TaskStatus::Success,
                progress: Some(100.0),
                current_stage: Some("COMPLETED".to_string()),
                start_time: Some(fixed_time(8, 0, 0)),
                end_time: Some(fixed_time(8, 1, 5)),
                created_at: Some(fixed_time(8, 0, 0)),
                ..Default::default()
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.task.id = id;
        self
    }

    pub fn with_job_code(mut self, job_code: &str) -> Self {
        self.task.job_code = job_code.to_string();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.task.status = status;
        self
    }

    /// 运行中的任务没有结束时间
    pub fn running(mut self) -> Self {
        self.task.status = TaskStatus::Running;
        self.task.end_time = None;
        self.task.progress = Some(40.0);
        self
    }

    pub fn with_error(mut self, message: &str) -> Self {
        self.task.status = TaskStatus::Failed;
        self.task.error_message = Some(message.to_string());
        self
    }

    pub fn with_execution_log(mut self, raw: &str) -> Self {
        self.task.execution_log = Some(raw.to_string());
        self
    }

    pub fn build(self) -> TaskSummary {
        self.task
    }

    /// 按服务端 camelCase 外形输出
    pub fn to_json(&self) -> Value {
        let time = |t: Option<NaiveDateTime>| {
            t.map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
        };
        json!({
            "id": self.task.id,
            "jobCode": self.task.job_code,
            "batchNumber": self.task.batch_number,
            "nodeName": self.task.node_name,
            "status": self.task.status.as_str(),
            "progress": self.task.progress,
            "currentStage": self.task.current_stage,
            "errorMessage": self.task.error_message,
            "startTime": time(self.task.start_time),
            "endTime": time(self.task.end_time),
            "createdAt": time(self.task.created_at),
            "executionLog": self.task.execution_log,
        })
    }
}

impl Default for TaskSummaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `{data, total}` 列表响应
pub fn list_body(items: Vec<Value>, total: u64) -> Value {
    json!({ "data": items, "total": total, "page": 0, "size": 20 })
}

pub fn stats_body(total: u64, running: u64, success: u64, failed: u64) -> Value {
    json!({ "total": total, "running": running, "success": success, "failed": failed })
}

pub fn trigger_body(task_id: i64, batch_number: &str, message: &str) -> Value {
    json!({ "taskId": task_id, "batchNumber": batch_number, "message": message })
}

pub fn config_entry(config_key: &str) -> JobConfigEntry {
    JobConfigEntry {
        config_key: config_key.to_string(),
        content_yaml: None,
        updated_at: Some(fixed_time(9, 0, 0)),
    }
}

pub fn config_list_body(keys: &[&str]) -> Value {
    Value::Array(
        keys.iter()
            .map(|key| json!({ "configKey": key, "updatedAt": "2024-03-01T09:00:00" }))
            .collect(),
    )
}

pub fn manual_export_record(id: i64, kind: ManualExportKind, table: &str) -> ManualExportRecord {
    ManualExportRecord {
        id,
        kind,
        job_code: "daily_orders".to_string(),
        table_name: table.to_string(),
        status: Some("SUCCESS".to_string()),
        requested_at: Some(fixed_time(10, 0, 0)),
        ..Default::default()
    }
}

pub fn disk_body(path: &str, used_percentage: f64) -> Value {
    json!({
        "path": path,
        "totalSpaceGb": 100.0,
        "usableSpaceGb": 100.0 - used_percentage,
        "usedSpaceGb": used_percentage,
        "usablePercentage": 100.0 - used_percentage,
        "usedPercentage": used_percentage,
    })
}
