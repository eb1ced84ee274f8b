//! Dated JSON artifacts.
//!
//! Every artifact lands at `{directory}/{prefix}_{YYYYMMDD}.json`, where the
//! date comes from the injected [`Clock`]. Same-day reruns overwrite.

use std::fs;
use std::path::PathBuf;

use etl_core::error::{EtlError, Result};
use etl_core::formatting::artifact_file_name;
use etl_core::time_utils::Clock;
use serde::Serialize;
use tracing::debug;

/// Prefix for the CSV summary report.
pub const SUMMARY_PREFIX: &str = "real_estate_summary";

/// Prefix for the HTTP raw snapshot.
pub const RAW_PREFIX: &str = "raw";

/// Prefix for the HTTP fetch summary.
pub const FETCH_SUMMARY_PREFIX: &str = "summary";

/// Writes serializable reports as pretty-printed, date-stamped JSON files.
pub struct ReportWriter<C: Clock> {
    directory: PathBuf,
    prefix: String,
    clock: C,
}

impl<C: Clock> ReportWriter<C> {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>, clock: C) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            clock,
        }
    }

    /// Path the next [`write`](Self::write) call will produce.
    pub fn target_path(&self) -> PathBuf {
        self.directory
            .join(artifact_file_name(&self.prefix, self.clock.today()))
    }

    /// Serialize `report` to the dated file, creating the directory first.
    ///
    /// Non-ASCII text is written verbatim; an existing file for the same
    /// day is replaced.
    pub fn write<T: Serialize + ?Sized>(&self, report: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.directory).map_err(|source| EtlError::FileWrite {
            path: self.directory.clone(),
            source,
        })?;

        let path = self.target_path();
        let json = serde_json::to_string_pretty(report)?;

        fs::write(&path, json).map_err(|source| EtlError::FileWrite {
            path: path.clone(),
            source,
        })?;

        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
