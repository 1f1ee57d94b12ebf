use super::{Config, ConfigError};
use crate::aggregator::{BucketPolicy, BucketWidth, TimeRange};
use crate::classifier::ClassificationThresholds;
use crate::normalizer::parse_timestamp_str;
use crate::pipeline::AnalysisConfig;
use std::time::Duration;

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Thresholds are required and have no defaults
        self.thresholds()?;

        if self.start.is_none() && self.last.is_none() {
            return Err(ConfigError::InvalidConfig(
                "A range is required: pass --start or --last".to_string(),
            ));
        }

        if self.bucket_width_secs == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "Bucket width must be greater than 0".to_string(),
            ));
        }

        if self.max_buckets == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "Max buckets must be greater than 0".to_string(),
            ));
        }

        if self.top_errors == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "Top errors must be greater than 0".to_string(),
            ));
        }

        if let Some(ladder) = &self.file.buckets.ladder_secs
            && (ladder.is_empty() || ladder.contains(&0))
        {
            return Err(ConfigError::InvalidConfig(
                "Bucket ladder must be non-empty and contain only positive widths".to_string(),
            ));
        }

        if let Some(pricing) = &self.file.pricing {
            pricing.validate()?;
        }

        Ok(())
    }

    pub fn thresholds(&self) -> Result<ClassificationThresholds, ConfigError> {
        let duration = self.duration_warning_ms.ok_or_else(|| {
            ConfigError::InvalidConfig(
                "duration_warning_ms is required (--duration-warning-ms or [thresholds])"
                    .to_string(),
            )
        })?;
        let ratio = self.memory_warning_ratio.ok_or_else(|| {
            ConfigError::InvalidConfig(
                "memory_warning_ratio is required (--memory-warning-ratio or [thresholds])"
                    .to_string(),
            )
        })?;
        Ok(ClassificationThresholds::new(duration, ratio)?)
    }

    /// The requested window; `now_ms` stands in for a missing `--end`.
    pub fn time_range(&self, now_ms: i64) -> Result<TimeRange, ConfigError> {
        let end_ms = match &self.end {
            Some(end) => parse_instant("end", end)?,
            None => now_ms,
        };

        let range = match (&self.start, &self.last) {
            (Some(start), _) => TimeRange::new(parse_instant("start", start)?, end_ms)?,
            (None, Some(last)) => TimeRange::ending_at(end_ms, parse_relative_duration(last)?)?,
            (None, None) => {
                return Err(ConfigError::InvalidConfig(
                    "A range is required: pass --start or --last".to_string(),
                ));
            }
        };
        Ok(range)
    }

    pub fn analysis_config(&self) -> Result<AnalysisConfig, ConfigError> {
        let mut config = AnalysisConfig::new(self.thresholds()?);

        if let Some(ladder_secs) = &self.file.buckets.ladder_secs {
            let ladder = ladder_secs
                .iter()
                .map(|secs| BucketWidth::from_duration(Duration::from_secs(*secs)))
                .collect::<Result<Vec<_>, _>>()?;
            config.bucket_policy = BucketPolicy::new(config.bucket_policy.max_buckets(), ladder)?;
        }
        if let Some(max_buckets) = self.max_buckets {
            config.bucket_policy = config.bucket_policy.with_max_buckets(max_buckets)?;
        }
        if let Some(secs) = self.bucket_width_secs {
            config.bucket_width = Some(BucketWidth::from_duration(Duration::from_secs(secs))?);
        }

        config.options.timeout_is_error = self.timeout_is_error;
        config.options.out_of_memory_is_error = self.out_of_memory_is_error;
        config.pricing.clone_from(&self.file.pricing);
        if let Some(limit) = self.top_errors {
            config.top_errors_limit = limit;
        }

        Ok(config)
    }
}

fn parse_instant(name: &str, text: &str) -> Result<i64, ConfigError> {
    parse_timestamp_str(text).ok_or_else(|| {
        ConfigError::InvalidConfig(format!(
            "Invalid {name} '{text}': expected epoch milliseconds or ISO 8601"
        ))
    })
}

/// Parse `30s`, `15m`, `1h`, `7d` or `2w`.
pub fn parse_relative_duration(text: &str) -> Result<Duration, ConfigError> {
    let text = text.trim();
    let invalid = || {
        ConfigError::InvalidConfig(format!(
            "Invalid relative range '{text}': expected a number followed by s, m, h, d or w"
        ))
    };

    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (amount, unit) = text.split_at(split);
    let amount: u64 = amount.parse().map_err(|_| invalid())?;
    let unit_secs = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    match amount.checked_mul(unit_secs) {
        Some(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(invalid()),
    }
}
