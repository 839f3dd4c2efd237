//! Command line configuration

use std::path::PathBuf;

use clap::{Args, Parser};
use rust_decimal::Decimal;

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Rank customers by simple lifetime value
#[derive(Debug, Parser)]
#[command(name = "ltv", about = "Rank customers by simple lifetime value", long_about = None)]
pub struct Config {
    /// Event file to ingest (JSON or YAML list of event records)
    #[arg(short, long, env = "LTV_EVENTS")]
    pub events: PathBuf,

    /// Number of customers to report
    #[arg(short, long, env = "LTV_TOP", default_value_t = 10)]
    pub top: usize,

    /// Average customer lifespan in years
    #[arg(long, env = "LTV_LIFESPAN_YEARS", default_value = "10")]
    pub lifespan_years: Decimal,

    /// ISO currency code used to display lifetime values
    #[arg(short, long, env = "LTV_CURRENCY", default_value = "USD")]
    pub currency: String,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
