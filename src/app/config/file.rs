//! Optional TOML configuration file.
//!
//! ```toml
//! [thresholds]
//! duration_warning_ms = 3000
//! memory_warning_ratio = 0.8
//!
//! [buckets]
//! max_buckets = 120
//! ladder_secs = [60, 300, 3600]
//!
//! [aggregation]
//! timeout_is_error = true
//!
//! [pricing]
//! price_per_request = 0.0000002
//! price_per_gb_second = 0.0000166667
//! default_memory_mb = 128
//! ```

use super::ConfigError;
use crate::aggregator::AggregationOptions;
use crate::correlator::PricingTable;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub thresholds: ThresholdsSection,
    pub buckets: BucketsSection,
    pub aggregation: Option<AggregationOptions>,
    pub pricing: Option<PricingTable>,
    pub insights: InsightsSection,
    pub input: InputSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdsSection {
    pub duration_warning_ms: Option<f64>,
    pub memory_warning_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BucketsSection {
    /// Fixed bucket width; overrides the ladder.
    pub width_secs: Option<u64>,
    pub max_buckets: Option<usize>,
    pub ladder_secs: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InsightsSection {
    pub top_errors: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputSection {
    pub groups: Vec<String>,
    pub log_group: Option<String>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let config = FileConfig::from_toml(
            r#"
            [thresholds]
            duration_warning_ms = 3000
            memory_warning_ratio = 0.8

            [buckets]
            max_buckets = 120
            ladder_secs = [60, 300]

            [aggregation]
            timeout_is_error = true

            [pricing]
            price_per_request = 0.0000002
            price_per_gb_second = 0.0000166667

            [pricing.function_memory_mb]
            orders = 512

            [insights]
            top_errors = 3

            [input]
            groups = ["/aws/lambda/orders"]
            "#,
        )
        .unwrap();

        assert_eq!(config.thresholds.duration_warning_ms, Some(3000.0));
        assert_eq!(config.buckets.ladder_secs, Some(vec![60, 300]));
        assert!(config.aggregation.unwrap().timeout_is_error);
        assert!(!config.aggregation.unwrap().out_of_memory_is_error);
        let pricing = config.pricing.unwrap();
        assert_eq!(pricing.function_memory_mb.get("orders"), Some(&512.0));
        assert_eq!(pricing.default_memory_mb, None);
        assert_eq!(config.insights.top_errors, Some(3));
        assert_eq!(config.input.groups, vec!["/aws/lambda/orders"]);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(FileConfig::from_toml("").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(matches!(
            FileConfig::from_toml("[thresholds]\nduration_ms = 1"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
