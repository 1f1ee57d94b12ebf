use crate::classifier::RegexError;
use thiserror::Error;

/// Errors surfaced by the analysis core.
///
/// Per-record problems are never reported here; they are tallied as skipped
/// records instead. Only whole-input or configuration violations are errors.
#[derive(Error, Debug, Clone)]
pub enum AnalysisError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid time range: start {start_ms} must be before end {end_ms}")]
    InvalidRange { start_ms: i64, end_ms: i64 },

    #[error("Invalid bucket width: {0}")]
    InvalidBucketWidth(String),

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Invalid pricing table: {0}")]
    InvalidPricing(String),

    #[error("Signature table error: {0}")]
    Regex(#[from] RegexError),
}
