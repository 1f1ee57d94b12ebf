use super::category::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix CloudWatch uses for log groups written by Lambda functions.
pub const LAMBDA_LOG_GROUP_PREFIX: &str = "/aws/lambda/";

/// Scope for records that arrive without a log group.
pub const UNGROUPED_SCOPE: &str = "ungrouped";

/// Names of the fields the classifier may extract from a message.
pub mod fields {
    pub const REQUEST_ID: &str = "request_id";
    pub const DURATION_MS: &str = "duration_ms";
    pub const BILLED_DURATION_MS: &str = "billed_duration_ms";
    pub const INIT_DURATION_MS: &str = "init_duration_ms";
    pub const MEMORY_SIZE_MB: &str = "memory_size_mb";
    pub const MAX_MEMORY_USED_MB: &str = "max_memory_used_mb";
    pub const MEMORY_UTILIZATION: &str = "memory_utilization";
    pub const TIMEOUT_SECONDS: &str = "timeout_seconds";
    pub const HTTP_STATUS: &str = "http_status";
    pub const EXCEPTION_TYPE: &str = "exception_type";

    /// Numeric fields summarised per bucket from execution reports.
    pub const REPORT_STAT_FIELDS: [&str; 5] = [
        DURATION_MS,
        BILLED_DURATION_MS,
        MEMORY_SIZE_MB,
        MAX_MEMORY_USED_MB,
        INIT_DURATION_MS,
    ];
}

/// A single log line in the pipeline's uniform shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub log_group: String,
    pub log_stream: String,
    pub message: String,
}

impl LogRecord {
    pub fn new(
        timestamp: i64,
        log_group: impl Into<String>,
        log_stream: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            log_group: log_group.into(),
            log_stream: log_stream.into(),
            message: message.into(),
        }
    }

    /// Aggregation scope of this record; `UNGROUPED_SCOPE` when it has no
    /// log group.
    pub fn scope(&self) -> &str {
        scope_for_log_group(&self.log_group).unwrap_or(UNGROUPED_SCOPE)
    }
}

/// Maps a log group onto the identifier shared with function metrics.
///
/// `/aws/lambda/orders-api` becomes `orders-api`; other groups are kept whole.
pub fn scope_for_log_group(log_group: &str) -> Option<&str> {
    let trimmed = log_group.trim();
    let scope = trimmed
        .strip_prefix(LAMBDA_LOG_GROUP_PREFIX)
        .unwrap_or(trimmed);
    if scope.is_empty() { None } else { Some(scope) }
}

/// A value pulled out of a log message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            FieldValue::Number(_) => None,
        }
    }
}

/// A `LogRecord` with its classification and extracted fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: LogRecord,
    pub category: Category,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extracted_fields: BTreeMap<String, FieldValue>,
}

impl ClassifiedRecord {
    pub fn number(&self, field: &str) -> Option<f64> {
        self.extracted_fields.get(field).and_then(FieldValue::as_number)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.extracted_fields.get(field).and_then(FieldValue::as_text)
    }

    /// True for `REPORT RequestId` lines, i.e. one completed invocation.
    pub fn is_execution_report(&self) -> bool {
        self.extracted_fields.contains_key(fields::DURATION_MS)
    }
}
