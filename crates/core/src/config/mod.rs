//! 控制台配置
//!
//! 加载顺序：内置默认值 → TOML 配置文件 → 环境变量（前缀 `KEL_CONSOLE`，分隔符 `__`）。

pub mod models;

pub use models::{ApiConfig, ConsoleConfig, DiskConfig, PollingConfig, TaskViewConfig};
