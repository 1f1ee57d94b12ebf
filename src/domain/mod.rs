//! Domain layer for lambda-insights.
//!
//! Contains the canonical types shared across the pipeline:
//! - `LogRecord` / `ClassifiedRecord`: normalized and classified log lines
//! - `Category`: classification outcome
//! - `MetricPoint` / `MetricName`: function-execution metric samples
//! - `AnalysisError`: error type for the analysis core

pub mod category;
pub mod error;
pub mod log_record;
pub mod metric;

pub use category::Category;
pub use error::AnalysisError;
pub use log_record::{
    ClassifiedRecord, FieldValue, LogRecord, UNGROUPED_SCOPE, fields, scope_for_log_group,
};
pub use metric::{MetricName, MetricPoint};
