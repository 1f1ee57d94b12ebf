use crate::aggregator::Stats;
use crate::domain::{ClassifiedRecord, fields};
use serde::Serialize;

/// Lambda memory is allocated in these steps for the recommendation.
pub const MEMORY_STEP_MB: f64 = 64.0;
pub const MIN_MEMORY_MB: f64 = 128.0;
pub const MAX_MEMORY_MB: f64 = 3008.0;
/// Headroom applied on top of p95 usage.
pub const MEMORY_HEADROOM: f64 = 1.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryRecommendation {
    pub current_memory_mb: f64,
    pub recommended_memory_mb: f64,
    pub avg_memory_used_mb: f64,
    pub max_memory_used_mb: f64,
    pub p95_memory_used_mb: f64,
    /// Average use over the current size.
    pub utilization: f64,
    /// Fraction of the current size that the recommendation frees up.
    pub potential_savings: f64,
}

/// Suggest a memory size from execution reports.
///
/// p95 of max memory used plus headroom, rounded to the nearest step and
/// clamped to the allowed range. Returns `None` without usable reports.
pub fn recommend_memory(records: &[ClassifiedRecord]) -> Option<MemoryRecommendation> {
    let used: Vec<f64> = records
        .iter()
        .filter_map(|record| record.number(fields::MAX_MEMORY_USED_MB))
        .collect();
    let stats = Stats::from_samples(&used)?;

    // Most recent configured size wins if it changed within the window
    let current_memory_mb = records
        .iter()
        .filter_map(|record| {
            record
                .number(fields::MEMORY_SIZE_MB)
                .filter(|size| *size > 0.0)
                .map(|size| (record.record.timestamp, size))
        })
        .max_by_key(|(timestamp, _)| *timestamp)
        .map(|(_, size)| size)?;

    let recommended_memory_mb = ((stats.p95 * MEMORY_HEADROOM / MEMORY_STEP_MB).round()
        * MEMORY_STEP_MB)
        .clamp(MIN_MEMORY_MB, MAX_MEMORY_MB);

    let potential_savings = if current_memory_mb > recommended_memory_mb {
        (current_memory_mb - recommended_memory_mb) / current_memory_mb
    } else {
        0.0
    };

    Some(MemoryRecommendation {
        current_memory_mb,
        recommended_memory_mb,
        avg_memory_used_mb: stats.avg,
        max_memory_used_mb: stats.max,
        p95_memory_used_mb: stats.p95,
        utilization: stats.avg / current_memory_mb,
        potential_savings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, FieldValue, LogRecord};
    use std::collections::BTreeMap;

    fn report(timestamp: i64, size: f64, used: f64) -> ClassifiedRecord {
        ClassifiedRecord {
            record: LogRecord::new(timestamp, "/aws/lambda/fn", "s", "REPORT"),
            category: Category::Info,
            extracted_fields: BTreeMap::from([
                (fields::MEMORY_SIZE_MB.to_string(), FieldValue::Number(size)),
                (fields::MAX_MEMORY_USED_MB.to_string(), FieldValue::Number(used)),
            ]),
        }
    }

    #[test]
    fn test_over_provisioned_function() {
        let records: Vec<_> = (0..20).map(|i| report(i, 1024.0, 200.0)).collect();

        let recommendation = recommend_memory(&records).unwrap();

        // 200 * 1.2 = 240 -> nearest 64 step is 256
        assert_eq!(recommendation.recommended_memory_mb, 256.0);
        assert_eq!(recommendation.current_memory_mb, 1024.0);
        assert_eq!(recommendation.potential_savings, 0.75);
        assert!((recommendation.utilization - 200.0 / 1024.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_to_minimum_and_no_savings_when_tight() {
        let small = recommend_memory(&[report(0, 128.0, 20.0)]).unwrap();
        assert_eq!(small.recommended_memory_mb, MIN_MEMORY_MB);
        assert_eq!(small.potential_savings, 0.0);

        let tight = recommend_memory(&[report(0, 512.0, 500.0)]).unwrap();
        assert_eq!(tight.recommended_memory_mb, 576.0);
        assert_eq!(tight.potential_savings, 0.0);
    }

    #[test]
    fn test_latest_memory_size_is_current() {
        let records = vec![report(10, 512.0, 100.0), report(5, 1024.0, 100.0)];
        assert_eq!(recommend_memory(&records).unwrap().current_memory_mb, 512.0);
    }

    #[test]
    fn test_no_reports() {
        let plain = ClassifiedRecord {
            record: LogRecord::new(0, "/aws/lambda/fn", "s", "hello"),
            category: Category::Info,
            extracted_fields: BTreeMap::new(),
        };
        assert!(recommend_memory(&[plain]).is_none());
        assert!(recommend_memory(&[]).is_none());
    }
}
