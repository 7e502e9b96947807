use serde::{Deserialize, Serialize};

use crate::errors::{ConsoleError, ConsoleResult};

fn default_interval_seconds() -> u64 {
    5
}

fn default_page_size() -> u32 {
    20
}

fn default_recent_limit() -> u32 {
    10
}

fn default_disk_path() -> String {
    "/data".to_string()
}

/// 自动刷新配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// 概览页统计的时间窗口（天），为空表示全部
    #[serde(default)]
    pub overview_days: Option<u32>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            overview_days: None,
        }
    }
}

impl PollingConfig {
    pub fn validate(&self) -> ConsoleResult<()> {
        if self.interval_seconds == 0 {
            return Err(ConsoleError::config_error("刷新间隔必须大于0"));
        }
        if self.overview_days == Some(0) {
            return Err(ConsoleError::config_error(
                "概览时间窗口必须大于0，不限制时请省略该项",
            ));
        }
        Ok(())
    }
}

/// 任务列表视图配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskViewConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// 概览页"最近任务"条数
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,
}

impl Default for TaskViewConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            recent_limit: default_recent_limit(),
        }
    }
}

impl TaskViewConfig {
    pub fn validate(&self) -> ConsoleResult<()> {
        if self.page_size == 0 {
            return Err(ConsoleError::config_error("分页大小必须大于0"));
        }
        if self.recent_limit == 0 {
            return Err(ConsoleError::config_error("最近任务条数必须大于0"));
        }
        Ok(())
    }
}

/// 磁盘空间检查配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskConfig {
    #[serde(default = "default_disk_path")]
    pub default_path: String,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            default_path: default_disk_path(),
        }
    }
}
