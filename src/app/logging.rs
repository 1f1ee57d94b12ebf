use super::config::{ConfigError, LogFormat, LogLevel};
use crate::pipeline::AnalysisReport;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Logs go to stderr; `RUST_LOG` directives
/// take precedence over `level`.
pub fn init_logging(level: LogLevel, format: LogFormat) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(tracing::Level::from(level).into()));

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .with(filter)
            .try_init(),
    };

    result.map_err(|e| ConfigError::InvalidConfig(format!("Failed to initialize logging: {e}")))
}

/// Summarise a finished report for operators.
pub fn log_report(report: &AnalysisReport) {
    let range = report.range();
    info!(
        start_ms = range.start_ms(),
        end_ms = range.end_ms(),
        bucket_width_ms = report.width().as_millis(),
        scopes = report.aggregation.scopes().len(),
        buckets = report.aggregation.summaries.len(),
        health_rows = report.health.len(),
        "Analysis complete"
    );

    let errors = &report.insights.errors;
    if errors.error_count > 0 {
        info!(
            error_count = errors.error_count,
            unique_errors = errors.unique_errors,
            "Failures found in range"
        );
    }

    let skipped = &report.skipped;
    if skipped.total() > 0 {
        warn!(
            normalize = skipped.normalize,
            out_of_range = skipped.out_of_range,
            metrics = skipped.metrics,
            "Skipped input records"
        );
    }
}
