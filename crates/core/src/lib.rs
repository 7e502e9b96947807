pub mod config;
pub mod errors;
pub mod logging;

pub use config::{ApiConfig, ConsoleConfig, DiskConfig, PollingConfig, TaskViewConfig};
pub use errors::*;
pub use logging::{init_logging, LogConfig, LogLevel, OutputFormat};
