use thiserror::Error;

/// 通用的兜底提示，服务端未返回 `error` 字段时使用
pub const GENERIC_FAILURE_MESSAGE: &str = "请求失败";

/// 控制台错误类型定义
///
/// 对应四类错误中的两类需要向调用方传播的错误：
/// 客户端校验错误（不发起请求）与前台操作失败（服务端或传输层错误）。
/// 可选子资源的 404 与后台刷新失败不会以错误值出现。
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConsoleError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    #[error("响应格式无法解析: {0}")]
    Decode(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl ConsoleError {
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 服务端返回了非 2xx 状态
    pub fn http<M: Into<String>>(status: u16, message: M) -> Self {
        Self::Api {
            status: Some(status),
            message: message.into(),
        }
    }

    /// 请求未到达服务端或未收到响应
    pub fn transport<M: Into<String>>(message: M) -> Self {
        Self::Api {
            status: None,
            message: message.into(),
        }
    }

    pub fn decode<M: Into<String>>(message: M) -> Self {
        Self::Decode(message.into())
    }

    pub fn config_error<M: Into<String>>(message: M) -> Self {
        Self::Configuration(message.into())
    }

    /// 面向操作员展示的文本
    pub fn message(&self) -> String {
        match self {
            Self::Validation { message, .. } | Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// 统一的Result类型
pub type ConsoleResult<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_prefers_server_text() {
        let err = ConsoleError::http(400, "不能删除全局配置 __global__");
        assert_eq!(err.message(), "不能删除全局配置 __global__");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_transport_error_has_no_status() {
        let err = ConsoleError::transport("connection refused");
        assert_eq!(err.status(), None);
        assert_eq!(err.message(), "connection refused");
    }

    #[test]
    fn test_validation_error() {
        let err = ConsoleError::validation("contentYaml", "配置内容不能为空");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "配置内容不能为空");
    }

    #[test]
    fn test_not_found() {
        assert!(ConsoleError::http(404, "Not Found").is_not_found());
    }
}
