pub mod entities;
pub mod formatters;
pub mod task_query_builder;
pub mod timestamps;
pub mod value_objects;

pub use entities::*;
pub use formatters::{
    format_bytes, format_date_time, format_duration, format_percentage, parse_execution_log,
    DiskUsageLevel, ExecutionLogEntry, StatusStyle,
};
pub use task_query_builder::TaskQueryBuilder;
pub use value_objects::*;
