//! Flat, chart-ready rows and the serialized report shape.

use crate::aggregator::{AggregateSummary, TimeBucket, TimeRange};
use crate::correlator::FunctionHealthSummary;
use crate::domain::{Category, MetricName, fields};
use crate::insights::Insights;
use crate::normalizer::format_millis;
use crate::pipeline::{AnalysisReport, SkipCounts};
use serde::{Serialize, Serializer};

/// One bucket of one scope, with a column per category and statistic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub scope: String,
    pub bucket_start: String,
    pub bucket_start_ms: i64,
    pub bucket_width_ms: i64,
    pub total: u64,
    pub error: u64,
    pub warning: u64,
    pub cold_start: u64,
    pub timeout: u64,
    pub out_of_memory: u64,
    pub info: u64,
    pub error_rate: f64,
    pub invocations: Option<f64>,
    pub errors: Option<f64>,
    pub throttles: Option<f64>,
    pub duration_avg_ms: Option<f64>,
    pub duration_p95_ms: Option<f64>,
    pub duration_max_ms: Option<f64>,
    pub memory_used_avg_mb: Option<f64>,
    pub memory_used_max_mb: Option<f64>,
    pub report_duration_avg_ms: Option<f64>,
    pub report_duration_p95_ms: Option<f64>,
    pub report_billed_duration_sum_ms: Option<f64>,
    pub report_max_memory_used_mb: Option<f64>,
    pub report_init_duration_avg_ms: Option<f64>,
}

impl SummaryRow {
    pub fn new(bucket: &TimeBucket, summary: &AggregateSummary) -> Self {
        let metric = |name: MetricName| summary.metric_stats().get(&name);
        let report = |field: &str| summary.report_stats().get(field);

        Self {
            scope: bucket.scope.clone(),
            bucket_start: format_millis(bucket.start_ms),
            bucket_start_ms: bucket.start_ms,
            bucket_width_ms: bucket.width_ms,
            total: summary.total(),
            error: summary.count(Category::Error),
            warning: summary.count(Category::Warning),
            cold_start: summary.count(Category::ColdStart),
            timeout: summary.count(Category::Timeout),
            out_of_memory: summary.count(Category::OutOfMemory),
            info: summary.count(Category::Info),
            error_rate: summary.error_rate(),
            invocations: metric(MetricName::Invocations).map(|s| s.sum),
            errors: metric(MetricName::Errors).map(|s| s.sum),
            throttles: metric(MetricName::Throttles).map(|s| s.sum),
            duration_avg_ms: metric(MetricName::Duration).map(|s| s.avg),
            duration_p95_ms: metric(MetricName::Duration).map(|s| s.p95),
            duration_max_ms: metric(MetricName::Duration).map(|s| s.max),
            memory_used_avg_mb: metric(MetricName::MemoryUsed).map(|s| s.avg),
            memory_used_max_mb: metric(MetricName::MemoryUsed).map(|s| s.max),
            report_duration_avg_ms: report(fields::DURATION_MS).map(|s| s.avg),
            report_duration_p95_ms: report(fields::DURATION_MS).map(|s| s.p95),
            report_billed_duration_sum_ms: report(fields::BILLED_DURATION_MS).map(|s| s.sum),
            report_max_memory_used_mb: report(fields::MAX_MEMORY_USED_MB).map(|s| s.max),
            report_init_duration_avg_ms: report(fields::INIT_DURATION_MS).map(|s| s.avg),
        }
    }
}

/// One correlated `(function, bucket)` row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthRow {
    pub function_name: String,
    pub bucket_start: String,
    pub bucket_start_ms: i64,
    pub bucket_width_ms: i64,
    pub invocations: f64,
    pub errors: f64,
    pub throttles: f64,
    pub error_rate: f64,
    pub duration_avg_ms: Option<f64>,
    pub duration_p95_ms: Option<f64>,
    pub duration_max_ms: Option<f64>,
    pub memory_used_avg_mb: Option<f64>,
    pub memory_used_max_mb: Option<f64>,
    pub log_records: u64,
    pub log_errors: u64,
    pub log_warnings: u64,
    pub log_timeouts: u64,
    pub log_out_of_memory: u64,
    pub cold_starts: u64,
    pub log_error_rate: f64,
    pub cold_start_rate: f64,
    pub estimated_cost: Option<f64>,
}

impl From<&FunctionHealthSummary> for HealthRow {
    fn from(health: &FunctionHealthSummary) -> Self {
        Self {
            function_name: health.function_name.clone(),
            bucket_start: format_millis(health.bucket_start_ms),
            bucket_start_ms: health.bucket_start_ms,
            bucket_width_ms: health.bucket_width_ms,
            invocations: health.invocations,
            errors: health.errors,
            throttles: health.throttles,
            error_rate: health.error_rate,
            duration_avg_ms: health.duration.map(|s| s.avg),
            duration_p95_ms: health.duration.map(|s| s.p95),
            duration_max_ms: health.duration.map(|s| s.max),
            memory_used_avg_mb: health.memory_used.map(|s| s.avg),
            memory_used_max_mb: health.memory_used.map(|s| s.max),
            log_records: health.log_records,
            log_errors: health.log_errors,
            log_warnings: health.log_warnings,
            log_timeouts: health.log_timeouts,
            log_out_of_memory: health.log_out_of_memory,
            cold_starts: health.cold_starts,
            log_error_rate: health.log_error_rate,
            cold_start_rate: health.cold_start_rate,
            estimated_cost: health.estimated_cost,
        }
    }
}

impl AnalysisReport {
    /// One row per bucket, ordered by scope then time.
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.aggregation
            .summaries
            .iter()
            .map(|(bucket, summary)| SummaryRow::new(bucket, summary))
            .collect()
    }

    pub fn health_rows(&self) -> Vec<HealthRow> {
        self.health.iter().map(HealthRow::from).collect()
    }
}

#[derive(Serialize)]
struct RangeView {
    start: String,
    end: String,
    start_ms: i64,
    end_ms: i64,
}

impl From<&TimeRange> for RangeView {
    fn from(range: &TimeRange) -> Self {
        Self {
            start: format_millis(range.start_ms()),
            end: format_millis(range.end_ms()),
            start_ms: range.start_ms(),
            end_ms: range.end_ms(),
        }
    }
}

#[derive(Serialize)]
struct ReportView<'a> {
    range: RangeView,
    bucket_width_ms: i64,
    scopes: Vec<&'a str>,
    summaries: Vec<SummaryRow>,
    health: Vec<HealthRow>,
    insights: &'a Insights,
    skipped: &'a SkipCounts,
}

impl Serialize for AnalysisReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ReportView {
            range: RangeView::from(self.range()),
            bucket_width_ms: self.width().as_millis(),
            scopes: self.aggregation.scopes(),
            summaries: self.summary_rows(),
            health: self.health_rows(),
            insights: &self.insights,
            skipped: &self.skipped,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use crate::aggregator::{BucketWidth, TimeRange};
    use crate::classifier::ClassificationThresholds;
    use crate::pipeline::{AnalysisConfig, AnalysisInput, analyze};
    use serde_json::json;

    fn report() -> crate::pipeline::AnalysisReport {
        let events = json!([
            {"timestamp": 1_000, "message": "ERROR boom", "logGroupName": "/aws/lambda/orders"},
            {"timestamp": 2_000, "message": "REPORT RequestId: r1 Duration: 120.5 ms Billed Duration: 121 ms Memory Size: 128 MB Max Memory Used: 64 MB", "logGroupName": "/aws/lambda/orders"}
        ]);
        let metrics = json!([
            {"functionName": "orders", "metricName": "Duration", "timestamp": 1_500, "value": 100.0},
            {"functionName": "orders", "metricName": "Invocations", "timestamp": 1_500, "value": 2.0}
        ]);
        let input = AnalysisInput {
            metric_samples: Some(&metrics),
            ..AnalysisInput::new(TimeRange::new(0, 120_000).unwrap(), &events)
        };
        let config = AnalysisConfig::new(ClassificationThresholds::new(1000.0, 0.9).unwrap())
            .with_bucket_width(BucketWidth::MINUTE);
        analyze(&input, &config).unwrap()
    }

    #[test]
    fn test_summary_rows_flatten_counts_and_stats() {
        let rows = report().summary_rows();

        assert_eq!(rows.len(), 2);
        let first = &rows[0];
        assert_eq!(first.scope, "orders");
        assert_eq!(first.bucket_start, "1970-01-01T00:00:00.000Z");
        assert_eq!(first.total, 2);
        assert_eq!(first.error, 1);
        assert_eq!(first.info, 1);
        assert_eq!(first.error_rate, 0.5);
        assert_eq!(first.duration_avg_ms, Some(100.0));
        assert_eq!(first.invocations, Some(2.0));
        assert_eq!(first.report_duration_avg_ms, Some(120.5));
        assert_eq!(first.report_max_memory_used_mb, Some(64.0));

        assert_eq!(rows[1].total, 0);
        assert_eq!(rows[1].invocations, None);
    }

    #[test]
    fn test_health_rows_and_report_json() {
        let report = report();

        let health = report.health_rows();
        assert_eq!(health.len(), 1);
        assert_eq!(health[0].function_name, "orders");
        assert_eq!(health[0].invocations, 2.0);
        assert_eq!(health[0].duration_avg_ms, Some(100.0));
        assert_eq!(health[0].log_errors, 1);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["bucket_width_ms"], 60_000);
        assert_eq!(value["scopes"], json!(["orders"]));
        assert_eq!(value["summaries"].as_array().unwrap().len(), 2);
        assert_eq!(value["insights"]["errors"]["error_count"], 1);
        assert_eq!(value["skipped"]["normalize"], 0);
    }
}
