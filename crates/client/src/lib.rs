//! KEL 作业平台 HTTP 客户端适配层

pub mod client;
pub mod request;
pub mod transport;

pub use client::{normalize_error, ConfigKeyScope, ConsoleApiClient};
pub use request::{ApiRequest, ApiResponse, HttpMethod};
pub use transport::{HttpTransport, ReqwestTransport};
