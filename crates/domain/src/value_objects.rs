use std::fmt;

use kel_console_core::{ConsoleError, ConsoleResult};
use serde::{Deserialize, Serialize};

use crate::entities::TaskSummary;

/// 全局默认配置的保留键，不允许删除
pub const GLOBAL_CONFIG_KEY: &str = "__global__";

/// 作业配置键
///
/// 构造时去除首尾空白并拒绝空值，后续调用点不必重复校验。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigKey(String);

impl ConfigKey {
    pub fn parse(field: &str, raw: &str) -> ConsoleResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConsoleError::validation(field, "请选择或填写作业配置"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn global() -> Self {
        Self(GLOBAL_CONFIG_KEY.to_string())
    }

    pub fn is_global(&self) -> bool {
        self.0 == GLOBAL_CONFIG_KEY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 非空文本字段，统一去除首尾空白
pub fn required_text(field: &str, raw: &str, message: &str) -> ConsoleResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConsoleError::validation(field, message));
    }
    Ok(trimmed.to_string())
}

/// 可选文本字段：空白视为未填写
pub fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// 任务列表过滤条件，空字符串表示不限制
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub job_code: String,
    pub status: String,
}

impl TaskFilter {
    pub fn new<J: Into<String>, S: Into<String>>(job_code: J, status: S) -> Self {
        Self {
            job_code: job_code.into(),
            status: status.into(),
        }
    }

    pub fn by_job<J: Into<String>>(job_code: J) -> Self {
        Self::new(job_code, "")
    }

    pub fn job_code(&self) -> Option<&str> {
        non_blank(&self.job_code)
    }

    pub fn status(&self) -> Option<&str> {
        non_blank(&self.status)
    }

    pub fn is_empty(&self) -> bool {
        self.job_code().is_none() && self.status().is_none()
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// 分页状态：page 从 0 开始，total 以最近一次服务端响应为准
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl Pagination {
    pub fn new(size: u32) -> Self {
        Self {
            page: 0,
            size: size.max(1),
            total: 0,
        }
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.size)
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(20)
    }
}

fn total_pages(total: u64, size: u32) -> u32 {
    if size == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// 一页任务查询结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPage {
    pub items: Vec<TaskSummary>,
    pub total: u64,
}

impl TaskPage {
    pub fn total_pages(&self, size: u32) -> u32 {
        total_pages(self.total, size)
    }
}
