use serde::{Deserialize, Serialize};

/// Summary statistics over one bucket's samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub p95: f64,
    pub sum: f64,
}

impl Stats {
    /// Compute statistics over the finite values in `samples`.
    ///
    /// Returns `None` when there is nothing to summarise. A single sample is
    /// reported for every statistic.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();
        let min = sorted[0];
        let max = sorted[count - 1];
        let p95 = percentile_sorted(&sorted, 0.95)?;

        Some(Self {
            count,
            min,
            max,
            avg: sum / count as f64,
            p95,
            sum,
        })
    }
}

/// Percentile of an ascending slice using linear interpolation between the
/// two nearest ranks (rank = q * (n - 1)).
pub fn percentile_sorted(sorted: &[f64], quantile: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&quantile) {
        return None;
    }

    let rank = quantile * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Percentile of unsorted samples; non-finite values are ignored.
pub fn percentile(samples: &[f64], quantile: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, quantile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sample_reports_itself() {
        let stats = Stats::from_samples(&[42.0]).unwrap();
        assert_eq!(stats.min, 42.0);
        assert_eq!(stats.max, 42.0);
        assert_eq!(stats.avg, 42.0);
        assert_eq!(stats.p95, 42.0);
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn test_p95_interpolates_between_ranks() {
        // rank = 0.95 * 4 = 3.8 -> 40 + (50 - 40) * 0.8
        let stats = Stats::from_samples(&[50.0, 10.0, 30.0, 20.0, 40.0]).unwrap();
        assert!((stats.p95 - 48.0).abs() < 1e-9);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 50.0);
        assert_eq!(stats.avg, 30.0);
        assert_eq!(stats.sum, 150.0);
    }

    #[test]
    fn test_non_finite_samples_are_ignored() {
        let stats = Stats::from_samples(&[f64::NAN, 1.0, f64::INFINITY, 3.0]).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.avg, 2.0);
        assert!(Stats::from_samples(&[f64::NAN]).is_none());
        assert!(Stats::from_samples(&[]).is_none());
    }

    #[test]
    fn test_percentile_bounds() {
        let samples = [3.0, 1.0, 2.0];
        assert_eq!(percentile(&samples, 0.0), Some(1.0));
        assert_eq!(percentile(&samples, 1.0), Some(3.0));
        assert_eq!(percentile(&samples, 0.5), Some(2.0));
        assert_eq!(percentile(&samples, 1.5), None);
        assert_eq!(percentile(&[], 0.5), None);
    }
}
