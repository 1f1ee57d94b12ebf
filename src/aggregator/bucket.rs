use crate::domain::AnalysisError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Half-open time window `[start_ms, end_ms)` in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    start_ms: i64,
    end_ms: i64,
}

impl TimeRange {
    pub fn new(start_ms: i64, end_ms: i64) -> Result<Self, AnalysisError> {
        if start_ms >= end_ms {
            return Err(AnalysisError::InvalidRange { start_ms, end_ms });
        }
        Ok(Self { start_ms, end_ms })
    }

    /// The window of length `length` ending at `end_ms`.
    pub fn ending_at(end_ms: i64, length: Duration) -> Result<Self, AnalysisError> {
        let length_ms = i64::try_from(length.as_millis()).map_err(|_| {
            AnalysisError::InvalidRange {
                start_ms: i64::MIN,
                end_ms,
            }
        })?;
        Self::new(end_ms.saturating_sub(length_ms), end_ms)
    }

    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> i64 {
        self.end_ms
    }

    pub fn length_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start_ms && timestamp < self.end_ms
    }
}

/// Width of one aggregation bucket, always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BucketWidth(i64);

impl BucketWidth {
    pub const SECOND: BucketWidth = BucketWidth(SECOND_MS);
    pub const MINUTE: BucketWidth = BucketWidth(MINUTE_MS);
    pub const HOUR: BucketWidth = BucketWidth(HOUR_MS);
    pub const DAY: BucketWidth = BucketWidth(DAY_MS);

    pub fn from_millis(millis: i64) -> Result<Self, AnalysisError> {
        if millis <= 0 {
            return Err(AnalysisError::InvalidBucketWidth(format!(
                "bucket width must be positive, got {millis}ms"
            )));
        }
        Ok(Self(millis))
    }

    pub fn from_duration(duration: Duration) -> Result<Self, AnalysisError> {
        let millis = i64::try_from(duration.as_millis()).map_err(|_| {
            AnalysisError::InvalidBucketWidth(format!("bucket width {duration:?} is too large"))
        })?;
        Self::from_millis(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Number of buckets needed to cover `range`: `ceil(length / width)`.
    pub fn bucket_count(&self, range: &TimeRange) -> usize {
        let length = range.length_ms();
        let count = length / self.0 + i64::from(length % self.0 != 0);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Start of the bucket holding `timestamp`, with buckets laid out from
    /// `origin_ms` in steps of this width.
    pub fn bucket_start(&self, origin_ms: i64, timestamp: i64) -> i64 {
        let offset = timestamp.saturating_sub(origin_ms);
        origin_ms.saturating_add(offset.div_euclid(self.0).saturating_mul(self.0))
    }
}

/// Chooses a bucket width for a range so the series stays chartable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketPolicy {
    max_buckets: usize,
    ladder: Vec<BucketWidth>,
}

impl Default for BucketPolicy {
    fn default() -> Self {
        Self {
            max_buckets: 100,
            ladder: vec![
                BucketWidth::SECOND,
                BucketWidth(10 * SECOND_MS),
                BucketWidth::MINUTE,
                BucketWidth(5 * MINUTE_MS),
                BucketWidth::HOUR,
                BucketWidth::DAY,
                BucketWidth(7 * DAY_MS),
            ],
        }
    }
}

impl BucketPolicy {
    /// A policy over `ladder` (sorted and de-duplicated here).
    pub fn new(max_buckets: usize, mut ladder: Vec<BucketWidth>) -> Result<Self, AnalysisError> {
        if max_buckets == 0 {
            return Err(AnalysisError::InvalidBucketWidth(
                "max_buckets must be greater than 0".to_string(),
            ));
        }
        if ladder.is_empty() {
            return Err(AnalysisError::InvalidBucketWidth(
                "bucket ladder must contain at least one width".to_string(),
            ));
        }
        ladder.sort();
        ladder.dedup();
        Ok(Self {
            max_buckets,
            ladder,
        })
    }

    pub fn with_max_buckets(self, max_buckets: usize) -> Result<Self, AnalysisError> {
        Self::new(max_buckets, self.ladder)
    }

    pub fn max_buckets(&self) -> usize {
        self.max_buckets
    }

    pub fn ladder(&self) -> &[BucketWidth] {
        &self.ladder
    }

    /// The finest ladder width that keeps `range` within `max_buckets`.
    ///
    /// Ranges too long for the coarsest rung get `ceil(length / max_buckets)`.
    pub fn width_for(&self, range: &TimeRange) -> BucketWidth {
        if let Some(width) = self
            .ladder
            .iter()
            .find(|width| width.bucket_count(range) <= self.max_buckets)
        {
            return *width;
        }

        let max = i64::try_from(self.max_buckets).unwrap_or(i64::MAX);
        let length = range.length_ms();
        BucketWidth((length / max + i64::from(length % max != 0)).max(1))
    }
}

/// Aggregation key: one scope (function or log group) over one interval.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeBucket {
    pub scope: String,
    pub start_ms: i64,
    pub width_ms: i64,
}

impl TimeBucket {
    pub fn new(scope: impl Into<String>, start_ms: i64, width: BucketWidth) -> Self {
        Self {
            scope: scope.into(),
            start_ms,
            width_ms: width.as_millis(),
        }
    }

    pub fn end_ms(&self) -> i64 {
        self.start_ms.saturating_add(self.width_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_validation() {
        assert!(TimeRange::new(10, 10).is_err());
        assert!(TimeRange::new(11, 10).is_err());
        let range = TimeRange::new(0, 10).unwrap();
        assert!(range.contains(0));
        assert!(range.contains(9));
        assert!(!range.contains(10));
        assert!(!range.contains(-1));
    }

    #[test]
    fn test_range_ending_at() {
        let range = TimeRange::ending_at(HOUR_MS * 5, Duration::from_secs(3600)).unwrap();
        assert_eq!(range.start_ms(), HOUR_MS * 4);
        assert_eq!(range.length_ms(), HOUR_MS);
    }

    #[test]
    fn test_bucket_count_rounds_up() {
        let width = BucketWidth::from_millis(10).unwrap();
        assert_eq!(width.bucket_count(&TimeRange::new(0, 100).unwrap()), 10);
        assert_eq!(width.bucket_count(&TimeRange::new(0, 101).unwrap()), 11);
        assert_eq!(width.bucket_count(&TimeRange::new(5, 6).unwrap()), 1);
    }

    #[test]
    fn test_bucket_start_is_relative_to_origin() {
        let width = BucketWidth::from_millis(10).unwrap();
        assert_eq!(width.bucket_start(0, 25), 20);
        assert_eq!(width.bucket_start(3, 25), 23);
        assert_eq!(width.bucket_start(3, 2), -7);
    }

    #[test]
    fn test_invalid_width() {
        assert!(BucketWidth::from_millis(0).is_err());
        assert!(BucketWidth::from_millis(-1).is_err());
        assert!(BucketWidth::from_duration(Duration::from_millis(0)).is_err());
    }

    #[test]
    fn test_default_policy_widths() {
        let policy = BucketPolicy::default();

        let hour = TimeRange::new(0, HOUR_MS).unwrap();
        assert_eq!(policy.width_for(&hour), BucketWidth::MINUTE);

        let day = TimeRange::new(0, DAY_MS).unwrap();
        assert_eq!(policy.width_for(&day), BucketWidth::HOUR);

        let week = TimeRange::new(0, 7 * DAY_MS).unwrap();
        assert_eq!(policy.width_for(&week), BucketWidth::DAY);

        let minute = TimeRange::new(0, MINUTE_MS).unwrap();
        assert_eq!(policy.width_for(&minute), BucketWidth::SECOND);
    }

    #[test]
    fn test_policy_falls_back_beyond_ladder() {
        let policy = BucketPolicy::new(10, vec![BucketWidth::MINUTE]).unwrap();
        let range = TimeRange::new(0, HOUR_MS).unwrap();
        let width = policy.width_for(&range);

        assert_eq!(width.as_millis(), 6 * MINUTE_MS);
        assert!(width.bucket_count(&range) <= 10);
    }

    #[test]
    fn test_policy_validation() {
        assert!(BucketPolicy::new(0, vec![BucketWidth::MINUTE]).is_err());
        assert!(BucketPolicy::new(10, vec![]).is_err());
    }
}
