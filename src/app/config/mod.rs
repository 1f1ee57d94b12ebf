mod cli;
pub mod file;
mod validation;

use crate::domain::AnalysisError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Diagnostic log format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output (default)
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// Report format on stdout or `--output-file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Whole report as one pretty-printed JSON document
    #[default]
    Json,
    /// One summary or health row per line
    Ndjson,
}

pub use cli::Config;
pub use file::FileConfig;
pub use validation::parse_relative_duration;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversions() {
        let analysis = ConfigError::from(AnalysisError::InvalidThreshold("negative".to_string()));
        assert!(matches!(analysis, ConfigError::Analysis(_)));
        assert_eq!(
            analysis.to_string(),
            AnalysisError::InvalidThreshold("negative".to_string()).to_string()
        );

        let io = ConfigError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(matches!(io, ConfigError::FileError(_)));
        assert_eq!(io.to_string(), "File error: gone");

        let parse = ConfigError::from(toml::from_str::<FileConfig>("[output").unwrap_err());
        assert!(matches!(parse, ConfigError::ParseError(_)));

        let invalid = ConfigError::InvalidConfig("bad".to_string());
        assert_eq!(invalid.to_string(), "Invalid configuration: bad");
    }
}
