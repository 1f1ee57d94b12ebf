use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Function-execution metrics the correlator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricName {
    Duration,
    MemoryUsed,
    Invocations,
    Errors,
    Throttles,
}

impl MetricName {
    pub const ALL: [MetricName; 5] = [
        MetricName::Duration,
        MetricName::MemoryUsed,
        MetricName::Invocations,
        MetricName::Errors,
        MetricName::Throttles,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricName::Duration => "Duration",
            MetricName::MemoryUsed => "MemoryUsed",
            MetricName::Invocations => "Invocations",
            MetricName::Errors => "Errors",
            MetricName::Throttles => "Throttles",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "duration" => Ok(MetricName::Duration),
            "memoryused" | "maxmemoryused" => Ok(MetricName::MemoryUsed),
            "invocations" => Ok(MetricName::Invocations),
            "errors" => Ok(MetricName::Errors),
            "throttles" => Ok(MetricName::Throttles),
            _ => Err(format!("Unknown metric name: {s}")),
        }
    }
}

/// One function-execution metric sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub function_name: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub metric_name: MetricName,
    pub value: f64,
    pub unit: String,
}
