//! # KEL Console Testing Utils
//!
//! 控制台各 crate 共用的测试工具。
//!
//! - **MockTransport**: 按 `METHOD /path` 脚本化响应的内存 HTTP 传输，
//!   记录每一次出站请求，便于断言请求次数、路径与查询参数
//! - **Builders**: 带默认值的实体构建器
//!
//! ```toml
//! [dev-dependencies]
//! kel-console-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod mocks;

pub use builders::*;
pub use mocks::*;
