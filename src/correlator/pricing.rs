use crate::domain::AnalysisError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Injected price list for cost estimation.
///
/// Nothing here is assumed: prices and memory sizes come from the caller's
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    /// Price of one invocation.
    pub price_per_request: f64,
    /// Price of one GB-second of compute.
    pub price_per_gb_second: f64,
    /// Memory size used when neither the function table nor the logs know it.
    #[serde(default)]
    pub default_memory_mb: Option<f64>,
    /// Configured memory per function.
    #[serde(default)]
    pub function_memory_mb: BTreeMap<String, f64>,
}

impl PricingTable {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let non_negative = |name: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(AnalysisError::InvalidPricing(format!(
                    "{name} must be a non-negative number, got {value}"
                )))
            }
        };
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(AnalysisError::InvalidPricing(format!(
                    "{name} must be a positive number, got {value}"
                )))
            }
        };

        non_negative("price_per_request", self.price_per_request)?;
        non_negative("price_per_gb_second", self.price_per_gb_second)?;
        if let Some(memory) = self.default_memory_mb {
            positive("default_memory_mb", memory)?;
        }
        for (function, memory) in &self.function_memory_mb {
            positive(&format!("function_memory_mb.{function}"), *memory)?;
        }
        Ok(())
    }

    /// Memory size for `function`: function table, then `observed_mb`
    /// (from execution reports), then the default.
    pub fn memory_mb_for(&self, function: &str, observed_mb: Option<f64>) -> Option<f64> {
        self.function_memory_mb
            .get(function)
            .copied()
            .or(observed_mb)
            .or(self.default_memory_mb)
    }

    /// Request charges plus `invocations * avg_duration * memory` GB-seconds.
    pub fn estimate(&self, invocations: f64, avg_duration_ms: f64, memory_mb: f64) -> f64 {
        let gb_seconds = invocations * (avg_duration_ms / 1000.0) * (memory_mb / 1024.0);
        invocations * self.price_per_request + gb_seconds * self.price_per_gb_second
    }
}
