//! Metrics correlator.
//!
//! Left-joins function metrics with the log-derived bucket summaries.
//! Metrics decide which `(function, bucket)` rows exist; log summaries only
//! fill in the log-derived columns.

pub mod pricing;

use crate::aggregator::{AggregateSummary, Aggregation, Stats, TimeBucket};
use crate::domain::{Category, MetricName, MetricPoint, fields};
use serde::Serialize;
use std::collections::BTreeMap;

pub use pricing::PricingTable;

/// Health of one function over one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionHealthSummary {
    pub function_name: String,
    pub bucket_start_ms: i64,
    pub bucket_width_ms: i64,

    // From metrics
    pub invocations: f64,
    pub errors: f64,
    pub throttles: f64,
    pub duration: Option<Stats>,
    pub memory_used: Option<Stats>,

    // From logs (zero when the bucket has no log summary)
    pub log_records: u64,
    pub log_errors: u64,
    pub log_warnings: u64,
    pub log_timeouts: u64,
    pub log_out_of_memory: u64,
    pub cold_starts: u64,
    pub log_error_rate: f64,

    // Derived
    pub error_rate: f64,
    pub cold_start_rate: f64,
    pub estimated_cost: Option<f64>,
}

impl FunctionHealthSummary {
    pub fn bucket(&self) -> TimeBucket {
        TimeBucket {
            scope: self.function_name.clone(),
            start_ms: self.bucket_start_ms,
            width_ms: self.bucket_width_ms,
        }
    }
}

#[derive(Default)]
struct MetricSamples(BTreeMap<MetricName, Vec<f64>>);

impl MetricSamples {
    fn stats(&self, name: MetricName) -> Option<Stats> {
        self.0.get(&name).and_then(|samples| Stats::from_samples(samples))
    }

    fn sum(&self, name: MetricName) -> f64 {
        self.stats(name).map_or(0.0, |stats| stats.sum)
    }
}

/// Produce one `FunctionHealthSummary` per distinct `(function, bucket)`
/// present in `metrics`, on the aggregation's bucket grid.
///
/// `estimated_cost` is filled only when a pricing table is supplied and a
/// memory size can be resolved for the function.
pub fn correlate(
    aggregation: &Aggregation,
    metrics: &[MetricPoint],
    pricing: Option<&PricingTable>,
) -> Vec<FunctionHealthSummary> {
    let width_ms = aggregation.width.as_millis();

    let mut joined: BTreeMap<(String, i64), MetricSamples> = BTreeMap::new();
    for point in metrics {
        let bucket_start = aggregation.bucket_start(point.timestamp);
        joined
            .entry((point.function_name.clone(), bucket_start))
            .or_default()
            .0
            .entry(point.metric_name)
            .or_default()
            .push(point.value);
    }

    joined
        .into_iter()
        .map(|((function_name, bucket_start_ms), samples)| {
            let bucket = TimeBucket {
                scope: function_name,
                start_ms: bucket_start_ms,
                width_ms,
            };
            let summary = aggregation.get(&bucket);
            health_row(bucket, &samples, summary, pricing)
        })
        .collect()
}

fn health_row(
    bucket: TimeBucket,
    samples: &MetricSamples,
    summary: Option<&AggregateSummary>,
    pricing: Option<&PricingTable>,
) -> FunctionHealthSummary {
    let invocations = samples.sum(MetricName::Invocations);
    let errors = samples.sum(MetricName::Errors);
    let duration = samples.stats(MetricName::Duration);

    let count = |category: Category| summary.map_or(0, |s| s.count(category));
    let report_stat = |field: &str| summary.and_then(|s| s.report_stats().get(field).copied());
    let cold_starts = count(Category::ColdStart);

    let estimated_cost = pricing.and_then(|table| {
        let observed_memory = report_stat(fields::MEMORY_SIZE_MB).map(|stats| stats.max);
        let memory_mb = table.memory_mb_for(&bucket.scope, observed_memory)?;
        let avg_duration_ms = duration
            .or_else(|| report_stat(fields::DURATION_MS))
            .map_or(0.0, |stats| stats.avg);
        Some(table.estimate(invocations, avg_duration_ms, memory_mb))
    });

    FunctionHealthSummary {
        invocations,
        errors,
        throttles: samples.sum(MetricName::Throttles),
        duration,
        memory_used: samples.stats(MetricName::MemoryUsed),
        log_records: summary.map_or(0, AggregateSummary::total),
        log_errors: count(Category::Error),
        log_warnings: count(Category::Warning),
        log_timeouts: count(Category::Timeout),
        log_out_of_memory: count(Category::OutOfMemory),
        cold_starts,
        log_error_rate: summary.map_or(0.0, AggregateSummary::error_rate),
        error_rate: ratio(errors, invocations),
        cold_start_rate: ratio(cold_starts as f64, invocations),
        estimated_cost,
        function_name: bucket.scope,
        bucket_start_ms: bucket.start_ms,
        bucket_width_ms: bucket.width_ms,
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
