use super::file::FileConfig;
use super::{ConfigError, LogFormat, LogLevel, OutputFormat};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Log events file (JSON array or FilterLogEvents response)
    #[arg(long, env = "INSIGHTS_EVENTS_FILE")]
    pub events: PathBuf,

    /// Metric samples file (JSON array or {"metrics": [...]})
    #[arg(long, env = "INSIGHTS_METRICS_FILE")]
    pub metrics: Option<PathBuf>,

    /// Range start (epoch milliseconds or ISO 8601)
    #[arg(long, env = "INSIGHTS_START")]
    pub start: Option<String>,

    /// Range end (epoch milliseconds or ISO 8601, defaults to now)
    #[arg(long, env = "INSIGHTS_END")]
    pub end: Option<String>,

    /// Relative range ending at --end, e.g. 15m, 1h, 7d
    #[arg(long, env = "INSIGHTS_LAST", conflicts_with = "start")]
    pub last: Option<String>,

    /// Log groups or function names that must appear in the output
    #[arg(long = "group", env = "INSIGHTS_GROUPS", value_delimiter = ',')]
    pub groups: Vec<String>,

    /// Log group for events that do not carry one
    #[arg(long, env = "LOG_GROUP")]
    pub log_group: Option<String>,

    /// Execution reports slower than this are warnings
    #[arg(long, env = "DURATION_WARNING_MS")]
    pub duration_warning_ms: Option<f64>,

    /// Execution reports above this memory utilisation are warnings
    #[arg(long, env = "MEMORY_WARNING_RATIO")]
    pub memory_warning_ratio: Option<f64>,

    /// Fixed bucket width in seconds (chosen from the range when absent)
    #[arg(long, env = "BUCKET_WIDTH_SECS")]
    pub bucket_width_secs: Option<u64>,

    /// Upper bound on buckets per scope when choosing a width
    #[arg(long, env = "MAX_BUCKETS")]
    pub max_buckets: Option<usize>,

    /// Count TIMEOUT records towards the error rate
    #[arg(long, env = "TIMEOUT_IS_ERROR")]
    pub timeout_is_error: bool,

    /// Count OUT_OF_MEMORY records towards the error rate
    #[arg(long, env = "OUT_OF_MEMORY_IS_ERROR")]
    pub out_of_memory_is_error: bool,

    /// Number of distinct failure messages to report
    #[arg(long, env = "TOP_ERRORS")]
    pub top_errors: Option<usize>,

    /// Report format
    #[arg(long, env = "OUTPUT_FORMAT", default_value = "json")]
    pub output: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(long, env = "OUTPUT_FILE")]
    pub output_file: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, env = "LOG_FORMAT", default_value = "compact")]
    pub log_format: LogFormat,

    /// Configuration file path (optional)
    #[arg(long, env = "INSIGHTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Settings loaded from `config` (not CLI arguments)
    #[arg(skip)]
    pub file: FileConfig,
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Config::try_parse_from(args)
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;
        config.load_file()
    }

    /// Load the configuration file, if one is named, and fill in every
    /// setting the command line left unset.
    pub fn load_file(mut self) -> Result<Self, ConfigError> {
        if let Some(path) = &self.config {
            let file = FileConfig::from_file(path)?;
            self.merge_file(file);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn merge_file(&mut self, file: FileConfig) {
        if self.duration_warning_ms.is_none() {
            self.duration_warning_ms = file.thresholds.duration_warning_ms;
        }
        if self.memory_warning_ratio.is_none() {
            self.memory_warning_ratio = file.thresholds.memory_warning_ratio;
        }
        if self.bucket_width_secs.is_none() {
            self.bucket_width_secs = file.buckets.width_secs;
        }
        if self.max_buckets.is_none() {
            self.max_buckets = file.buckets.max_buckets;
        }
        if self.top_errors.is_none() {
            self.top_errors = file.insights.top_errors;
        }
        if self.groups.is_empty() {
            self.groups.clone_from(&file.input.groups);
        }
        if self.log_group.is_none() {
            self.log_group.clone_from(&file.input.log_group);
        }
        if let Some(options) = file.aggregation {
            self.timeout_is_error |= options.timeout_is_error;
            self.out_of_memory_is_error |= options.out_of_memory_is_error;
        }
        self.file = file;
    }
}
