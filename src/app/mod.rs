pub mod config;
pub mod input;
pub mod logging;
pub mod output;

pub use config::{Config, ConfigError, FileConfig, LogFormat, LogLevel, OutputFormat};
pub use logging::{init_logging, log_report};

use crate::pipeline::{AnalysisReport, Analyzer, AnalysisInput};
use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

pub struct App {
    config: Config,
    analyzer: Analyzer,
}

impl App {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::from_config(Config::from_args(args)?)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let analyzer = Analyzer::new(config.analysis_config()?)?;
        Ok(Self { config, analyzer })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the inputs and analyze them, without writing anything.
    pub async fn analyze(&self, now_ms: i64) -> anyhow::Result<AnalysisReport> {
        let range = self.config.time_range(now_ms)?;
        let (events, metrics) =
            input::load_inputs(&self.config.events, self.config.metrics.as_deref()).await?;

        let input = AnalysisInput {
            range,
            scopes: &self.config.groups,
            log_events: &events,
            metric_samples: metrics.as_ref(),
            default_log_group: self.config.log_group.as_deref(),
        };
        debug!(
            start_ms = range.start_ms(),
            end_ms = range.end_ms(),
            scopes = self.config.groups.len(),
            "Running analysis"
        );

        self.analyzer
            .analyze(&input)
            .context("Analysis failed")
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let report = self.analyze(now_ms).await?;
        log_report(&report);

        output::write_report(&report, self.config.output, self.config.output_file.as_deref())
            .await?;
        if let Some(path) = &self.config.output_file {
            info!(path = %path.display(), "Report written");
        }
        Ok(())
    }
}

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Main entry point for the application
pub async fn main() -> anyhow::Result<()> {
    // clap handles --help and --version and exits on argument errors
    let config = Config::parse()
        .load_file()
        .context("Invalid configuration")?;

    init_logging(config.log_level, config.log_format)?;
    info!("Starting lambda-insights v{}", get_version());
    if let Some(path) = &config.config {
        info!(path = %path.display(), "Loaded configuration file");
    }

    App::from_config(config)?.run().await
}
