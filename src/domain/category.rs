use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of classifying a single log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Error,
    Warning,
    ColdStart,
    Timeout,
    OutOfMemory,
    Info,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Error,
        Category::Warning,
        Category::ColdStart,
        Category::Timeout,
        Category::OutOfMemory,
        Category::Info,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Error => "ERROR",
            Category::Warning => "WARNING",
            Category::ColdStart => "COLD_START",
            Category::Timeout => "TIMEOUT",
            Category::OutOfMemory => "OUT_OF_MEMORY",
            Category::Info => "INFO",
        }
    }

    /// Categories that represent a failed execution, regardless of how the
    /// error rate is configured.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Category::Error | Category::Timeout | Category::OutOfMemory
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
