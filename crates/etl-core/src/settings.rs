use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{EtlError, Result};

/// Default CSV input, relative to the working directory.
pub const DEFAULT_INPUT: &str = "data/real_estate_transactions.csv";

/// Default endpoint for the HTTP source.
pub const DEFAULT_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ── SourceKind ─────────────────────────────────────────────────────────────────

/// Where the pipeline reads its records from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Local CSV of transactions, summarized per district.
    Csv,
    /// Remote JSON endpoint, saved raw and optionally counted.
    Http,
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Daily snapshot and summary report for tabular or JSON records
#[derive(Parser, Debug, Clone)]
#[command(
    name = "data-automation-service",
    about = "Daily snapshot and summary report for tabular or JSON records",
    version
)]
pub struct Settings {
    /// Record source
    #[arg(long, value_enum, default_value_t = SourceKind::Csv, env = "ETL_SOURCE")]
    pub source: SourceKind,

    /// CSV input file (csv source)
    #[arg(long, default_value = DEFAULT_INPUT, env = "ETL_INPUT")]
    pub input: PathBuf,

    /// Directory for raw snapshots
    #[arg(long, default_value = "data", env = "ETL_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Directory for summary reports
    #[arg(long, default_value = "reports", env = "ETL_REPORTS_DIR")]
    pub reports_dir: PathBuf,

    /// Endpoint to fetch (http source)
    #[arg(long, default_value = DEFAULT_URL, env = "ETL_URL")]
    pub url: String,

    /// HTTP timeout in seconds (1-300)
    #[arg(
        long,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        env = "ETL_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u64).range(1..=300)
    )]
    pub timeout_secs: u64,

    /// Save the raw snapshot only, skip the summary report (http source)
    #[arg(long)]
    pub no_report: bool,

    /// Re-summarize today's saved raw snapshot instead of fetching (http source)
    #[arg(long, conflicts_with = "no_report")]
    pub no_fetch: bool,

    /// Timezone used for the date stamp (IANA name or "auto")
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Exit with a non-zero status when the input file is missing
    #[arg(long)]
    pub fail_on_missing: bool,
}

impl Settings {
    /// Parse the process arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::resolve(Self::parse())
    }

    /// Same as [`Settings::load`] but from an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve(Self::parse_from(args))
    }

    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Build the explicit pipeline configuration from these settings.
    pub fn to_pipeline_config(&self) -> Result<PipelineConfig> {
        if self.source == SourceKind::Http && self.url.trim().is_empty() {
            return Err(EtlError::Config("--url must not be empty".to_string()));
        }

        Ok(PipelineConfig {
            source: self.source,
            input_path: self.input.clone(),
            data_dir: self.data_dir.clone(),
            reports_dir: self.reports_dir.clone(),
            url: self.url.trim().to_string(),
            timeout: Duration::from_secs(self.timeout_secs),
            summarize: !self.no_report,
            fetch: !self.no_fetch,
        })
    }
}

// ── PipelineConfig ─────────────────────────────────────────────────────────────

/// Everything a pipeline run needs to know about paths and the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub source: SourceKind,
    pub input_path: PathBuf,
    pub data_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub url: String,
    pub timeout: Duration,
    /// Write the fetch summary after the raw snapshot (http source).
    pub summarize: bool,
    /// Fetch the URL; when false, reuse today's raw snapshot (http source).
    pub fetch: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Csv,
            input_path: PathBuf::from(DEFAULT_INPUT),
            data_dir: PathBuf::from("data"),
            reports_dir: PathBuf::from("reports"),
            url: DEFAULT_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            summarize: true,
            fetch: true,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
