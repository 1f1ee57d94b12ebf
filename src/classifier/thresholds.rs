use crate::domain::AnalysisError;
use serde::Serialize;

/// Cutoffs that turn an execution report into a `WARNING`.
///
/// There are no defaults: callers must say what counts as slow and what
/// counts as memory pressure for their functions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationThresholds {
    duration_warning_ms: f64,
    memory_warning_ratio: f64,
}

impl ClassificationThresholds {
    /// `memory_warning_ratio` is the fraction of configured memory
    /// (`Max Memory Used / Memory Size`) above which a report is flagged.
    pub fn new(duration_warning_ms: f64, memory_warning_ratio: f64) -> Result<Self, AnalysisError> {
        if !duration_warning_ms.is_finite() || duration_warning_ms <= 0.0 {
            return Err(AnalysisError::InvalidThreshold(format!(
                "duration_warning_ms must be a positive number, got {duration_warning_ms}"
            )));
        }
        if !memory_warning_ratio.is_finite()
            || memory_warning_ratio <= 0.0
            || memory_warning_ratio > 1.0
        {
            return Err(AnalysisError::InvalidThreshold(format!(
                "memory_warning_ratio must be in (0, 1], got {memory_warning_ratio}"
            )));
        }

        Ok(Self {
            duration_warning_ms,
            memory_warning_ratio,
        })
    }

    pub fn duration_warning_ms(&self) -> f64 {
        self.duration_warning_ms
    }

    pub fn memory_warning_ratio(&self) -> f64 {
        self.memory_warning_ratio
    }

    pub fn duration_exceeded(&self, duration_ms: Option<f64>) -> bool {
        duration_ms.is_some_and(|duration| duration > self.duration_warning_ms)
    }

    pub fn memory_exceeded(&self, utilization: Option<f64>) -> bool {
        utilization.is_some_and(|ratio| ratio > self.memory_warning_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_values() {
        assert!(ClassificationThresholds::new(0.0, 0.8).is_err());
        assert!(ClassificationThresholds::new(-5.0, 0.8).is_err());
        assert!(ClassificationThresholds::new(f64::NAN, 0.8).is_err());
        assert!(ClassificationThresholds::new(1000.0, 0.0).is_err());
        assert!(ClassificationThresholds::new(1000.0, 1.5).is_err());
        assert!(ClassificationThresholds::new(1000.0, f64::INFINITY).is_err());
        assert!(ClassificationThresholds::new(1000.0, 1.0).is_ok());
    }

    #[test]
    fn test_exceeded_is_strict() {
        let thresholds = ClassificationThresholds::new(1000.0, 0.9).unwrap();

        assert!(!thresholds.duration_exceeded(Some(1000.0)));
        assert!(thresholds.duration_exceeded(Some(1000.5)));
        assert!(!thresholds.duration_exceeded(None));

        assert!(!thresholds.memory_exceeded(Some(0.9)));
        assert!(thresholds.memory_exceeded(Some(0.95)));
        assert!(!thresholds.memory_exceeded(None));
    }
}
