use serde::{Deserialize, Serialize};

use crate::errors::{ConsoleError, ConsoleResult};

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

/// 作业平台 REST API 连接配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 超时策略由 HTTP 适配层持有，控制器本身不做取消
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> ConsoleResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConsoleError::config_error("API基础地址不能为空"));
        }
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            ConsoleError::config_error(format!("API基础地址无效: {} - {e}", self.base_url))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConsoleError::config_error(format!(
                "API基础地址仅支持 http/https: {}",
                self.base_url
            )));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConsoleError::config_error("请求超时时间必须大于0"));
        }
        Ok(())
    }
}
