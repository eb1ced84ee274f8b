//! Shared building blocks for the data automation pipeline.
//!
//! Holds the record and report types, the error type, command-line settings,
//! the injectable clock and small formatting helpers used by every other
//! crate in the workspace.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
