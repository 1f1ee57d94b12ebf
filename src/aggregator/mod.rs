//! Time-bucket aggregator.
//!
//! Reduces classified records and metric samples into one
//! `AggregateSummary` per `(scope, bucket)`. Every scope gets a complete
//! series over the requested range, including buckets with no data.

pub mod bucket;
pub mod stats;

use crate::domain::{
    AnalysisError, Category, ClassifiedRecord, MetricName, MetricPoint, fields,
    scope_for_log_group,
};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

pub use bucket::{BucketPolicy, BucketWidth, TimeBucket, TimeRange};
pub use stats::{Stats, percentile, percentile_sorted};

/// Upper bound on buckets per scope, whatever width the caller forces.
pub const MAX_SERIES_BUCKETS: usize = 100_000;

/// Which categories besides `ERROR` count towards the error rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationOptions {
    #[serde(default)]
    pub timeout_is_error: bool,
    #[serde(default)]
    pub out_of_memory_is_error: bool,
}

impl AggregationOptions {
    pub fn counts_as_error(&self, category: Category) -> bool {
        match category {
            Category::Error => true,
            Category::Timeout => self.timeout_is_error,
            Category::OutOfMemory => self.out_of_memory_is_error,
            _ => false,
        }
    }
}

/// What to aggregate: the window, the bucket width and the scopes that must
/// appear in the output even when they have no data.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRequest {
    range: TimeRange,
    width: BucketWidth,
    scopes: Vec<String>,
    options: AggregationOptions,
}

impl AggregationRequest {
    pub fn new(
        range: TimeRange,
        width: BucketWidth,
        scopes: impl IntoIterator<Item = impl AsRef<str>>,
        options: AggregationOptions,
    ) -> Result<Self, AnalysisError> {
        let bucket_count = width.bucket_count(&range);
        if bucket_count > MAX_SERIES_BUCKETS {
            return Err(AnalysisError::InvalidBucketWidth(format!(
                "{}ms buckets over a {}ms range would produce {bucket_count} buckets (max {MAX_SERIES_BUCKETS})",
                width.as_millis(),
                range.length_ms()
            )));
        }

        let mut scopes: Vec<String> = scopes
            .into_iter()
            .filter_map(|scope| scope_for_log_group(scope.as_ref()).map(str::to_string))
            .collect();
        scopes.sort();
        scopes.dedup();

        Ok(Self {
            range,
            width,
            scopes,
            options,
        })
    }

    pub fn range(&self) -> &TimeRange {
        &self.range
    }

    pub fn width(&self) -> BucketWidth {
        self.width
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn options(&self) -> &AggregationOptions {
        &self.options
    }

    pub fn bucket_count(&self) -> usize {
        self.width.bucket_count(&self.range)
    }
}

/// Per-bucket output. `error_rate` is always derived from the counts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateSummary {
    counts_by_category: BTreeMap<Category, u64>,
    metric_stats: BTreeMap<MetricName, Stats>,
    report_stats: BTreeMap<String, Stats>,
    options: AggregationOptions,
}

impl AggregateSummary {
    /// Non-zero category counts.
    pub fn counts_by_category(&self) -> &BTreeMap<Category, u64> {
        &self.counts_by_category
    }

    pub fn count(&self, category: Category) -> u64 {
        self.counts_by_category.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts_by_category.values().sum()
    }

    pub fn error_count(&self) -> u64 {
        self.counts_by_category
            .iter()
            .filter(|(category, _)| self.options.counts_as_error(**category))
            .map(|(_, count)| *count)
            .sum()
    }

    /// Errors over total records; 0 for an empty bucket.
    pub fn error_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.error_count() as f64 / total as f64
        }
    }

    /// Statistics over `MetricPoint`s that fell in this bucket.
    pub fn metric_stats(&self) -> &BTreeMap<MetricName, Stats> {
        &self.metric_stats
    }

    /// Statistics over fields extracted from execution reports.
    pub fn report_stats(&self) -> &BTreeMap<String, Stats> {
        &self.report_stats
    }

    pub fn is_empty(&self) -> bool {
        self.counts_by_category.is_empty() && self.metric_stats.is_empty()
    }
}

#[derive(Serialize)]
struct SummaryView<'a> {
    counts_by_category: &'a BTreeMap<Category, u64>,
    total: u64,
    error_rate: f64,
    metric_stats: &'a BTreeMap<MetricName, Stats>,
    report_stats: &'a BTreeMap<String, Stats>,
}

impl Serialize for AggregateSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SummaryView {
            counts_by_category: &self.counts_by_category,
            total: self.total(),
            error_rate: self.error_rate(),
            metric_stats: &self.metric_stats,
            report_stats: &self.report_stats,
        }
        .serialize(serializer)
    }
}

/// Records and samples left out of the aggregation, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationSkips {
    /// Records whose timestamp falls outside the requested range.
    pub out_of_range: usize,
    /// Metric samples outside the requested range (still correlated).
    pub metrics_out_of_range: usize,
}

impl AggregationSkips {
    pub fn records(&self) -> usize {
        self.out_of_range
    }
}

/// Complete aggregation output for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub range: TimeRange,
    pub width: BucketWidth,
    pub summaries: BTreeMap<TimeBucket, AggregateSummary>,
    pub skipped: AggregationSkips,
}

impl Aggregation {
    pub fn get(&self, bucket: &TimeBucket) -> Option<&AggregateSummary> {
        self.summaries.get(bucket)
    }

    /// Distinct scopes, in order.
    pub fn scopes(&self) -> Vec<&str> {
        let mut scopes: Vec<&str> = self.summaries.keys().map(|b| b.scope.as_str()).collect();
        scopes.dedup();
        scopes
    }

    /// The bucket series for one scope, in time order.
    pub fn series<'a>(
        &'a self,
        scope: &'a str,
    ) -> impl Iterator<Item = (&'a TimeBucket, &'a AggregateSummary)> + 'a {
        self.summaries
            .iter()
            .filter(move |(bucket, _)| bucket.scope == scope)
    }

    /// Bucket start for `timestamp` on this aggregation's grid.
    pub fn bucket_start(&self, timestamp: i64) -> i64 {
        self.width.bucket_start(self.range.start_ms(), timestamp)
    }
}

#[derive(Debug, Default)]
struct BucketAccumulator {
    counts: BTreeMap<Category, u64>,
    report_samples: BTreeMap<&'static str, Vec<f64>>,
    metric_samples: BTreeMap<MetricName, Vec<f64>>,
}

impl BucketAccumulator {
    fn add_record(&mut self, record: &ClassifiedRecord) {
        *self.counts.entry(record.category).or_insert(0) += 1;

        for field in fields::REPORT_STAT_FIELDS {
            if let Some(value) = record.number(field) {
                self.report_samples.entry(field).or_default().push(value);
            }
        }
    }

    fn add_metric(&mut self, point: &MetricPoint) {
        self.metric_samples
            .entry(point.metric_name)
            .or_default()
            .push(point.value);
    }

    fn finish(self, options: AggregationOptions) -> AggregateSummary {
        AggregateSummary {
            counts_by_category: self.counts,
            metric_stats: self
                .metric_samples
                .into_iter()
                .filter_map(|(name, samples)| Stats::from_samples(&samples).map(|s| (name, s)))
                .collect(),
            report_stats: self
                .report_samples
                .into_iter()
                .filter_map(|(field, samples)| {
                    Stats::from_samples(&samples).map(|s| (field.to_string(), s))
                })
                .collect(),
            options,
        }
    }
}

/// Bucket `records` and `metrics` over the request's range.
///
/// One pass over each input. Records outside the range are counted in
/// `skipped`; every scope (requested or seen) gets exactly
/// `request.bucket_count()` buckets.
///
/// Buckets are aligned to the range start: a record lands in
/// `start + floor((ts - start) / w) * w`. This equals the epoch-aligned
/// `floor(ts / w) * w` only when the start is a multiple of the width.
pub fn aggregate(
    records: &[ClassifiedRecord],
    metrics: &[MetricPoint],
    request: &AggregationRequest,
) -> Aggregation {
    let range = request.range;
    let width = request.width;
    let bucket_count = request.bucket_count();
    let mut skipped = AggregationSkips::default();

    let new_series = || -> Vec<BucketAccumulator> {
        (0..bucket_count).map(|_| BucketAccumulator::default()).collect()
    };

    let mut series: BTreeMap<String, Vec<BucketAccumulator>> = request
        .scopes
        .iter()
        .map(|scope| (scope.clone(), new_series()))
        .collect();

    for record in records {
        let scope = record.record.scope();
        let Some(index) = bucket_index(&range, width, record.record.timestamp) else {
            skipped.out_of_range += 1;
            continue;
        };
        let buckets = series.entry(scope.to_string()).or_insert_with(new_series);
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.add_record(record);
        }
    }

    for point in metrics {
        let Some(index) = bucket_index(&range, width, point.timestamp) else {
            skipped.metrics_out_of_range += 1;
            continue;
        };
        let buckets = series
            .entry(point.function_name.clone())
            .or_insert_with(new_series);
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.add_metric(point);
        }
    }

    let mut summaries = BTreeMap::new();
    for (scope, buckets) in series {
        for (index, accumulator) in buckets.into_iter().enumerate() {
            let start_ms = range.start_ms() + width.as_millis() * index as i64;
            summaries.insert(
                TimeBucket::new(scope.clone(), start_ms, width),
                accumulator.finish(request.options),
            );
        }
    }

    Aggregation {
        range,
        width,
        summaries,
        skipped,
    }
}

fn bucket_index(range: &TimeRange, width: BucketWidth, timestamp: i64) -> Option<usize> {
    if !range.contains(timestamp) {
        return None;
    }
    usize::try_from((timestamp - range.start_ms()) / width.as_millis()).ok()
}
