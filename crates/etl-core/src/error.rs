use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the ETL pipeline.
#[derive(Error, Debug)]
pub enum EtlError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report or snapshot could not be written to disk.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured input file does not exist.
    #[error("Input source not found: {0}")]
    SourceNotFound(PathBuf),

    /// A JSON document could not be parsed or produced.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The CSV reader failed at the stream level (not a single bad row).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The HTTP request failed, timed out, or returned a non-2xx status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the ETL crates.
pub type Result<T> = std::result::Result<T, EtlError>;
