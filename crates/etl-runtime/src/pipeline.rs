//! Pipeline driver.
//!
//! Runs one load → aggregate → write pass for the configured source and
//! prints tagged progress lines. The CSV source moves through
//! `Start → Loaded → Aggregated → Written → Done`, or stops at
//! `MissingSource → Aborted` when the input file is absent. The HTTP source
//! fetches, writes the raw snapshot and, unless disabled, a fetch summary.
//! With fetching disabled it re-summarizes today's saved snapshot instead.

use std::io::Write;
use std::path::PathBuf;

use etl_core::error::{EtlError, Result};
use etl_core::formatting::{format_optional, progress_line};
use etl_core::settings::{PipelineConfig, SourceKind};
use etl_core::time_utils::Clock;
use etl_data::aggregator::{summarize, summarize_payload};
use etl_data::fetch::{fetch_payload, Fetcher, HttpFetcher};
use etl_data::reader::{load_transactions, read_raw_payload};
use etl_data::writer::{ReportWriter, FETCH_SUMMARY_PREFIX, RAW_PREFIX, SUMMARY_PREFIX};
use tracing::{debug, info};

// ── Public types ──────────────────────────────────────────────────────────────

/// Where a run currently is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    Loaded,
    Aggregated,
    Written,
    Done,
    MissingSource,
    Aborted,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub source: SourceKind,
    pub state: RunState,
    /// Records loaded (CSV) or fetched (HTTP).
    pub records: usize,
    /// Rows rejected by the CSV loader.
    pub skipped: usize,
    /// Raw snapshot written by the HTTP source.
    pub raw_path: Option<PathBuf>,
    /// Summary report, when one was written.
    pub report_path: Option<PathBuf>,
}

/// Result of [`Pipeline::run`] when no unrecoverable error occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunReport),
    /// The CSV input, or the raw snapshot to reuse, was absent; nothing was
    /// written.
    MissingSource(PathBuf),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// One configured pipeline. Holds no state between runs.
pub struct Pipeline<C: Clock> {
    config: PipelineConfig,
    clock: C,
}

impl<C: Clock> Pipeline<C> {
    pub fn new(config: PipelineConfig, clock: C) -> Self {
        Self { config, clock }
    }

    /// Run once, using a real HTTP client for the HTTP source.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<RunOutcome> {
        match self.config.source {
            SourceKind::Csv => self.run_csv(out),
            SourceKind::Http => {
                let fetcher = HttpFetcher::new(self.config.timeout)?;
                self.run_http(&fetcher, out)
            }
        }
    }

    /// Run once with an explicit [`Fetcher`] for the HTTP source.
    pub fn run_with_fetcher<W, F>(&self, fetcher: &F, out: &mut W) -> Result<RunOutcome>
    where
        W: Write,
        F: Fetcher + ?Sized,
    {
        match self.config.source {
            SourceKind::Csv => self.run_csv(out),
            SourceKind::Http => self.run_http(fetcher, out),
        }
    }

    // ── Private implementation ────────────────────────────────────────────

    fn run_csv<W: Write>(&self, out: &mut W) -> Result<RunOutcome> {
        let input = &self.config.input_path;
        let mut state = RunState::Start;
        self.announce_start(out)?;
        progress(out, &format!("Loading data from {}", input.display()))?;

        let loaded = match load_transactions(input) {
            Ok(loaded) => loaded,
            Err(EtlError::SourceNotFound(path)) => {
                transition(&mut state, RunState::MissingSource);
                progress(
                    out,
                    &format!(
                        "ERROR: input CSV not found at {}. Place the transactions file there and rerun.",
                        path.display()
                    ),
                )?;
                transition(&mut state, RunState::Aborted);
                return Ok(RunOutcome::MissingSource(path));
            }
            Err(e) => return Err(e),
        };
        transition(&mut state, RunState::Loaded);

        progress(
            out,
            &format!("Loaded {} transactions", loaded.transactions.len()),
        )?;
        if loaded.skipped > 0 {
            progress(out, &format!("Skipped {} invalid rows", loaded.skipped))?;
        }

        let summary = summarize(&loaded.transactions);
        transition(&mut state, RunState::Aggregated);
        info!(
            "avg price {}, avg price/m2 {}, {} districts",
            format_optional(summary.avg_value),
            format_optional(summary.avg_value_per_area),
            summary.by_subcategory.len()
        );

        let writer = ReportWriter::new(&self.config.reports_dir, SUMMARY_PREFIX, &self.clock);
        let report_path = writer.write(&summary)?;
        transition(&mut state, RunState::Written);
        progress(
            out,
            &format!("Saved summary report to {}", report_path.display()),
        )?;

        transition(&mut state, RunState::Done);
        Ok(RunOutcome::Completed(RunReport {
            source: SourceKind::Csv,
            state,
            records: loaded.transactions.len(),
            skipped: loaded.skipped,
            raw_path: None,
            report_path: Some(report_path),
        }))
    }

    fn run_http<W, F>(&self, fetcher: &F, out: &mut W) -> Result<RunOutcome>
    where
        W: Write,
        F: Fetcher + ?Sized,
    {
        let url = self.config.url.as_str();
        let mut state = RunState::Start;
        self.announce_start(out)?;

        let raw_writer = ReportWriter::new(&self.config.data_dir, RAW_PREFIX, &self.clock);
        let (payload, raw_path) = if self.config.fetch {
            progress(out, &format!("Fetching data from {}", url))?;
            let payload = fetch_payload(fetcher, url, &self.clock)?;
            transition(&mut state, RunState::Loaded);

            let raw_path = raw_writer.write(&payload)?;
            progress(
                out,
                &format!(
                    "Saved {} records to {}",
                    payload.record_count(),
                    raw_path.display()
                ),
            )?;
            (payload, raw_path)
        } else {
            let raw_path = raw_writer.target_path();
            progress(out, &format!("Loading snapshot from {}", raw_path.display()))?;
            let payload = match read_raw_payload(&raw_path) {
                Ok(payload) => payload,
                Err(EtlError::SourceNotFound(path)) => {
                    transition(&mut state, RunState::MissingSource);
                    progress(
                        out,
                        &format!(
                            "ERROR: raw snapshot not found at {}. Run once with fetching enabled.",
                            path.display()
                        ),
                    )?;
                    transition(&mut state, RunState::Aborted);
                    return Ok(RunOutcome::MissingSource(path));
                }
                Err(e) => return Err(e),
            };
            transition(&mut state, RunState::Loaded);
            progress(
                out,
                &format!("Loaded {} records from snapshot", payload.record_count()),
            )?;
            (payload, raw_path)
        };
        let records = payload.record_count();

        let report_path = if self.config.summarize {
            let summary = summarize_payload(&payload, url);
            transition(&mut state, RunState::Aggregated);

            let writer =
                ReportWriter::new(&self.config.reports_dir, FETCH_SUMMARY_PREFIX, &self.clock);
            let path = writer.write(&summary)?;
            progress(out, &format!("Generated report at {}", path.display()))?;
            Some(path)
        } else {
            debug!("summary step disabled; raw snapshot only");
            None
        };
        transition(&mut state, RunState::Written);

        transition(&mut state, RunState::Done);
        Ok(RunOutcome::Completed(RunReport {
            source: SourceKind::Http,
            state,
            records,
            skipped: 0,
            raw_path: Some(raw_path),
            report_path,
        }))
    }

    fn announce_start<W: Write>(&self, out: &mut W) -> Result<()> {
        let today = self.clock.today();
        info!("Running {:?} pipeline for {}", self.config.source, today);
        progress(out, &format!("Running pipeline for {}", today.format("%Y-%m-%d")))
    }
}

fn progress<W: Write>(out: &mut W, message: &str) -> Result<()> {
    writeln!(out, "{}", progress_line(message))?;
    Ok(())
}

fn transition(state: &mut RunState, next: RunState) {
    debug!("pipeline state {:?} -> {:?}", state, next);
    *state = next;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
