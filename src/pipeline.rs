//! One-shot driver: normalize, classify, aggregate, correlate and compute
//! insights for a single request.

use crate::aggregator::{
    Aggregation, AggregationOptions, AggregationRequest, BucketPolicy, BucketWidth, TimeRange,
    aggregate,
};
use crate::classifier::{ClassificationThresholds, Classifier};
use crate::correlator::{FunctionHealthSummary, PricingTable, correlate};
use crate::domain::{AnalysisError, ClassifiedRecord};
use crate::insights::{DEFAULT_TOP_ERRORS, Insights};
use crate::normalizer::{Normalized, normalize_for_group, normalize_metrics};
use serde::Serialize;
use serde_json::Value;

/// Everything the core needs besides the input itself.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub thresholds: ClassificationThresholds,
    pub bucket_policy: BucketPolicy,
    /// Forces a bucket width instead of choosing one from `bucket_policy`.
    pub bucket_width: Option<BucketWidth>,
    pub options: AggregationOptions,
    pub pricing: Option<PricingTable>,
    pub top_errors_limit: usize,
}

impl AnalysisConfig {
    pub fn new(thresholds: ClassificationThresholds) -> Self {
        Self {
            thresholds,
            bucket_policy: BucketPolicy::default(),
            bucket_width: None,
            options: AggregationOptions::default(),
            pricing: None,
            top_errors_limit: DEFAULT_TOP_ERRORS,
        }
    }

    pub fn with_bucket_width(mut self, width: BucketWidth) -> Self {
        self.bucket_width = Some(width);
        self
    }

    pub fn with_options(mut self, options: AggregationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn width_for(&self, range: &TimeRange) -> BucketWidth {
        self.bucket_width
            .unwrap_or_else(|| self.bucket_policy.width_for(range))
    }
}

/// One analysis request: the window, the scopes that must appear, and the
/// raw payloads as returned by the log and metric APIs.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisInput<'a> {
    pub range: TimeRange,
    pub scopes: &'a [String],
    pub log_events: &'a Value,
    pub metric_samples: Option<&'a Value>,
    /// Log group for events that do not carry one.
    pub default_log_group: Option<&'a str>,
}

impl<'a> AnalysisInput<'a> {
    pub fn new(range: TimeRange, log_events: &'a Value) -> Self {
        Self {
            range,
            scopes: &[],
            log_events,
            metric_samples: None,
            default_log_group: None,
        }
    }
}

/// Input items left out of the report, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    /// Log events that failed normalization.
    pub normalize: usize,
    /// Records outside the requested range.
    pub out_of_range: usize,
    /// Metric samples that failed normalization.
    pub metrics: usize,
    /// Metric samples outside the range; still correlated.
    pub metrics_out_of_range: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.normalize + self.out_of_range + self.metrics
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub aggregation: Aggregation,
    pub health: Vec<FunctionHealthSummary>,
    pub insights: Insights,
    pub skipped: SkipCounts,
}

impl AnalysisReport {
    pub fn range(&self) -> &TimeRange {
        &self.aggregation.range
    }

    pub fn width(&self) -> BucketWidth {
        self.aggregation.width
    }
}

/// Reusable pipeline: compiles the signature table once.
#[derive(Debug, Clone)]
pub struct Analyzer {
    classifier: Classifier,
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        if let Some(pricing) = &config.pricing {
            pricing.validate()?;
        }
        Ok(Self {
            classifier: Classifier::new(config.thresholds)?,
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn analyze(&self, input: &AnalysisInput<'_>) -> Result<AnalysisReport, AnalysisError> {
        let range = input.range;
        let width = self.config.width_for(&range);
        let request =
            AggregationRequest::new(range, width, input.scopes, self.config.options)?;

        let Normalized {
            records,
            skipped: normalize_skipped,
        } = normalize_for_group(input.log_events, input.default_log_group)?;
        let metrics = match input.metric_samples {
            Some(samples) => normalize_metrics(samples)?,
            None => Normalized {
                records: Vec::new(),
                skipped: 0,
            },
        };

        let classified = self.classifier.classify_all(records);
        let aggregation = aggregate(&classified, &metrics.records, &request);
        let health = correlate(&aggregation, &metrics.records, self.config.pricing.as_ref());

        let in_range: Vec<ClassifiedRecord> = classified
            .into_iter()
            .filter(|record| range.contains(record.record.timestamp))
            .collect();
        let insights = Insights::compute(&in_range, self.config.top_errors_limit);

        let skipped = SkipCounts {
            normalize: normalize_skipped,
            out_of_range: aggregation.skipped.out_of_range,
            metrics: metrics.skipped,
            metrics_out_of_range: aggregation.skipped.metrics_out_of_range,
        };

        Ok(AnalysisReport {
            aggregation,
            health,
            insights,
            skipped,
        })
    }
}

/// Build an [`Analyzer`] for `config` and run it over `input`.
pub fn analyze(
    input: &AnalysisInput<'_>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    Analyzer::new(config.clone())?.analyze(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use serde_json::json;

    fn config() -> AnalysisConfig {
        AnalysisConfig::new(ClassificationThresholds::new(1000.0, 0.8).unwrap())
            .with_bucket_width(BucketWidth::MINUTE)
    }

    #[test]
    fn test_analyze_counts_skips_by_reason() {
        let events = json!([
            {"timestamp": 1_000, "message": "ERROR boom", "logGroupName": "/aws/lambda/orders"},
            {"timestamp": 999_999_999, "message": "late", "logGroupName": "/aws/lambda/orders"},
            {"timestamp": 2_000, "message": "no group"},
            {"message": "no timestamp", "logGroupName": "/aws/lambda/orders"}
        ]);
        let metrics = json!([
            {"functionName": "orders", "metricName": "Invocations", "timestamp": 1_000, "value": 4.0},
            {"functionName": "orders", "metricName": "Nope", "timestamp": 1_000, "value": 1.0}
        ]);
        let input = AnalysisInput {
            metric_samples: Some(&metrics),
            ..AnalysisInput::new(TimeRange::new(0, 120_000).unwrap(), &events)
        };

        let report = analyze(&input, &config()).unwrap();

        assert_eq!(report.skipped.normalize, 1);
        assert_eq!(report.skipped.out_of_range, 1);
        assert_eq!(report.skipped.metrics, 1);
        assert_eq!(report.skipped.total(), 3);
        assert_eq!(report.width(), BucketWidth::MINUTE);
        // orders plus the ungrouped record's scope, two buckets each
        assert_eq!(report.aggregation.summaries.len(), 4);
        assert_eq!(report.health.len(), 1);
        assert_eq!(report.insights.errors.error_count, 1);
    }

    #[test]
    fn test_default_log_group_fills_missing_groups() {
        let events = json!({"events": [{"timestamp": 5, "message": "ERROR x"}]});
        let input = AnalysisInput {
            default_log_group: Some("/aws/lambda/billing"),
            ..AnalysisInput::new(TimeRange::new(0, 60_000).unwrap(), &events)
        };

        let report = analyze(&input, &config()).unwrap();

        assert_eq!(report.aggregation.scopes(), vec!["billing"]);
        let (_, summary) = report.aggregation.series("billing").next().unwrap();
        assert_eq!(summary.count(Category::Error), 1);
    }

    #[test]
    fn test_rejects_non_sequence_payload() {
        let events = json!("not events");
        let input = AnalysisInput::new(TimeRange::new(0, 60_000).unwrap(), &events);

        assert!(matches!(
            analyze(&input, &config()),
            Err(AnalysisError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_invalid_pricing_fails_before_analysis() {
        let pricing = PricingTable {
            price_per_request: -1.0,
            price_per_gb_second: 0.0000166667,
            default_memory_mb: None,
            function_memory_mb: Default::default(),
        };
        let config = config().with_pricing(pricing);

        assert!(matches!(
            Analyzer::new(config),
            Err(AnalysisError::InvalidPricing(_))
        ));
    }
}
