pub mod api;
pub mod app_config;
pub mod polling;

pub use api::ApiConfig;
pub use app_config::ConsoleConfig;
pub use polling::{DiskConfig, PollingConfig, TaskViewConfig};
