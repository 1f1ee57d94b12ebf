// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_lossless,            // Infallible casts are clear enough with `as`
    clippy::cast_possible_truncation, // Hours, weekdays and bucket indexes are small
    clippy::cast_possible_wrap,       // Safe in non-negative contexts
    clippy::cast_precision_loss,      // Counts become rates and averages
    clippy::cast_sign_loss,           // Safe where values are known non-negative
    clippy::missing_errors_doc,       // Internal API
    clippy::missing_panics_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. AggregationRequest in aggregator module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

pub mod aggregator;
pub mod app;
pub mod classifier;
pub mod correlator;
pub mod domain;
pub mod insights;
pub mod normalizer;
pub mod pipeline;
pub mod rows;

// Re-export main types for easy access
pub use aggregator::{
    AggregateSummary, Aggregation, AggregationOptions, AggregationRequest, BucketPolicy,
    BucketWidth, Stats, TimeBucket, TimeRange, aggregate,
};
pub use classifier::{ClassificationThresholds, Classifier};
pub use correlator::{FunctionHealthSummary, PricingTable, correlate};
pub use domain::{
    AnalysisError, Category, ClassifiedRecord, FieldValue, LogRecord, MetricName, MetricPoint,
};
pub use insights::Insights;
pub use normalizer::{Normalized, normalize, normalize_for_group, normalize_metrics};
pub use pipeline::{AnalysisConfig, AnalysisInput, AnalysisReport, Analyzer, SkipCounts, analyze};
pub use rows::{HealthRow, SummaryRow};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
