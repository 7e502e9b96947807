//! 纯展示辅助函数：时间、耗时、状态样式、磁盘占用分级与执行日志解析

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::entities::TaskStatus;
use crate::timestamps;

const EMPTY_PLACEHOLDER: &str = "-";

pub fn format_date_time(value: Option<NaiveDateTime>) -> String {
    value
        .map(|t| t.format("%Y/%m/%d %H:%M:%S").to_string())
        .unwrap_or_else(|| EMPTY_PLACEHOLDER.to_string())
}

/// 将秒数格式化为 `X小时Y分Z秒`，只省略最高位的零
pub fn format_duration(seconds: Option<i64>) -> String {
    let Some(seconds) = seconds else {
        return EMPTY_PLACEHOLDER.to_string();
    };
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}小时{minutes}分{secs}秒")
    } else if minutes > 0 {
        format!("{minutes}分{secs}秒")
    } else {
        format!("{secs}秒")
    }
}

pub fn format_bytes(bytes: Option<i64>) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let Some(bytes) = bytes else {
        return EMPTY_PLACEHOLDER.to_string();
    };
    let bytes = bytes.max(0);
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

/// 状态徽标样式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusStyle {
    Info,
    Success,
    Danger,
    Secondary,
}

impl StatusStyle {
    pub fn for_status(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Running => StatusStyle::Info,
            TaskStatus::Success => StatusStyle::Success,
            TaskStatus::Failed => StatusStyle::Danger,
            TaskStatus::Cancelled | TaskStatus::Unknown => StatusStyle::Secondary,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            StatusStyle::Info => "bg-info",
            StatusStyle::Success => "bg-success",
            StatusStyle::Danger => "bg-danger",
            StatusStyle::Secondary => "bg-secondary",
        }
    }
}

/// 磁盘占用分级，下界包含在内
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskUsageLevel {
    Nominal,
    Warning,
    Critical,
}

impl DiskUsageLevel {
    pub const WARNING_THRESHOLD: f64 = 75.0;
    pub const CRITICAL_THRESHOLD: f64 = 90.0;

    pub fn classify(used_percentage: f64) -> Self {
        if used_percentage >= Self::CRITICAL_THRESHOLD {
            DiskUsageLevel::Critical
        } else if used_percentage >= Self::WARNING_THRESHOLD {
            DiskUsageLevel::Warning
        } else {
            DiskUsageLevel::Nominal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DiskUsageLevel::Nominal => "正常",
            DiskUsageLevel::Warning => "偏高",
            DiskUsageLevel::Critical => "告警",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            DiskUsageLevel::Nominal => "bg-success",
            DiskUsageLevel::Warning => "bg-warning",
            DiskUsageLevel::Critical => "bg-danger",
        }
    }
}

/// 执行日志中的一条记录
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionLogEntry {
    pub timestamp: Option<NaiveDateTime>,
    pub level: Option<String>,
    pub stage: Option<String>,
    pub message: String,
}

#[derive(Deserialize)]
struct RawLogEntry {
    #[serde(default, alias = "created_at", alias = "createdAt", alias = "time")]
    timestamp: Option<serde_json::Value>,
    #[serde(default, alias = "log_level", alias = "logLevel")]
    level: Option<String>,
    #[serde(default)]
    stage: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// 解析执行日志文本，任何无法解析的内容都返回空序列
pub fn parse_execution_log(raw: Option<&str>) -> Vec<ExecutionLogEntry> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<RawLogEntry>>(raw) {
        Ok(entries) => entries
            .into_iter()
            .map(|entry| ExecutionLogEntry {
                timestamp: entry.timestamp.as_ref().and_then(timestamps::parse_value),
                level: entry.level,
                stage: entry.stage,
                message: entry.message.unwrap_or_default(),
            })
            .collect(),
        Err(e) => {
            tracing::debug!("执行日志无法解析，按空日志处理: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Some(0)), "0秒");
        assert_eq!(format_duration(Some(65)), "1分5秒");
        assert_eq!(format_duration(Some(3661)), "1小时0分1秒");
        assert_eq!(format_duration(Some(3600)), "1小时0分0秒");
        assert_eq!(format_duration(None), "-");
    }

    #[test]
    fn test_format_date_time() {
        let t = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 5, 9)
            .unwrap();
        assert_eq!(format_date_time(Some(t)), "2024/03/01 08:05:09");
        assert_eq!(format_date_time(None), "-");
    }

    #[test]
    fn test_disk_usage_boundaries() {
        assert_eq!(DiskUsageLevel::classify(74.9), DiskUsageLevel::Nominal);
        assert_eq!(DiskUsageLevel::classify(75.0), DiskUsageLevel::Warning);
        assert_eq!(DiskUsageLevel::classify(89.9), DiskUsageLevel::Warning);
        assert_eq!(DiskUsageLevel::classify(90.0), DiskUsageLevel::Critical);
    }

    #[test]
    fn test_status_style() {
        assert_eq!(StatusStyle::for_status(TaskStatus::Running).css_class(), "bg-info");
        assert_eq!(StatusStyle::for_status(TaskStatus::Failed).css_class(), "bg-danger");
        assert_eq!(
            StatusStyle::for_status(TaskStatus::Unknown),
            StatusStyle::Secondary
        );
    }

    #[test]
    fn test_parse_execution_log() {
        let raw = r#"[
            {"log_level":"INFO","stage":"EXTRACT","message":"开始卸载","created_at":"2024-03-01T08:00:00"},
            {"log_level":"ERROR","message":"连接超时"}
        ]"#;
        let entries = parse_execution_log(Some(raw));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].stage.as_deref(), Some("EXTRACT"));
        assert!(entries[0].timestamp.is_some());
        assert_eq!(entries[1].message, "连接超时");
    }

    #[test]
    fn test_malformed_execution_log_is_empty() {
        assert!(parse_execution_log(Some("not json")).is_empty());
        assert!(parse_execution_log(Some(r#"{"message":"x"}"#)).is_empty());
        assert!(parse_execution_log(Some("")).is_empty());
        assert!(parse_execution_log(None).is_empty());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(Some(512)), "512 B");
        assert_eq!(format_bytes(Some(1536)), "1.50 KB");
        assert_eq!(format_bytes(Some(-5)), "0 B");
        assert_eq!(format_bytes(None), "-");
    }
}
