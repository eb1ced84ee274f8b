//! Record loading for the ETL pipeline.
//!
//! Reads transaction rows from a CSV file into [`Transaction`] values and
//! raw snapshots back from disk. Bad rows are skipped with a warning; only
//! stream-level failures abort a load.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use etl_core::error::{EtlError, Result};
use etl_core::models::{RawPayload, Transaction};
use tracing::{debug, warn};

// ── Public types ──────────────────────────────────────────────────────────────

/// Outcome of loading a CSV source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadResult {
    /// Valid transactions in file order.
    pub transactions: Vec<Transaction>,
    /// Number of rows rejected during coercion.
    pub skipped: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load transactions from the CSV file at `path`.
///
/// Returns [`EtlError::SourceNotFound`] when the file does not exist so the
/// caller can abort the run without writing anything.
pub fn load_transactions(path: &Path) -> Result<LoadResult> {
    if !path.exists() {
        warn!("Input file does not exist: {}", path.display());
        return Err(EtlError::SourceNotFound(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|source| EtlError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let result = parse_transactions(BufReader::new(file))?;

    debug!(
        "File {}: {} loaded, {} skipped",
        path.display(),
        result.transactions.len(),
        result.skipped,
    );

    Ok(result)
}

/// Parse CSV text with a header row into transactions.
///
/// Each row is matched to fields by header name. A row with a missing field
/// or a value that fails numeric coercion is logged and skipped. Columns
/// beyond the header are ignored. `price` and `area` must be finite.
pub fn parse_transactions<R: Read>(reader: R) -> Result<LoadResult> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut result = LoadResult::default();

    for record in rdr.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) if is_row_error(&e) => {
                warn!("Skipping invalid row {}: {}", row_label(e.position()), e);
                result.skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let parsed = record
            .deserialize::<Transaction>(Some(&headers))
            .map_err(|e| e.to_string())
            .and_then(check_finite);

        match parsed {
            Ok(txn) => result.transactions.push(txn),
            Err(cause) => {
                warn!(
                    "Skipping invalid row {} {:?}: {}",
                    row_label(record.position()),
                    record.iter().collect::<Vec<_>>(),
                    cause
                );
                result.skipped += 1;
            }
        }
    }

    Ok(result)
}

/// Read a raw snapshot previously written by the HTTP variant.
pub fn read_raw_payload(path: &Path) -> Result<RawPayload> {
    if !path.exists() {
        return Err(EtlError::SourceNotFound(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|source| EtlError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let payload: RawPayload = serde_json::from_reader(BufReader::new(file))?;
    debug!(
        "Read raw payload from {} ({} records)",
        path.display(),
        payload.record_count()
    );
    Ok(payload)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Errors confined to one record; the reader can continue past them.
fn is_row_error(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Utf8 { .. })
}

/// `NaN` and infinities parse as `f64` but cannot be summed into a report.
fn check_finite(txn: Transaction) -> std::result::Result<Transaction, String> {
    if !txn.price.is_finite() {
        return Err(format!("price is not a finite number: {}", txn.price));
    }
    if !txn.area.is_finite() {
        return Err(format!("area_m2 is not a finite number: {}", txn.area));
    }
    Ok(txn)
}

fn row_label(position: Option<&csv::Position>) -> String {
    match position {
        Some(pos) => format!("at line {}", pos.line()),
        None => "at unknown line".to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
