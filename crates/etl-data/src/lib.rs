//! Data layer for the automation pipeline.
//!
//! Loads transactions from CSV, fetches remote JSON, aggregates records into
//! summary reports and writes date-stamped JSON artifacts.

pub mod aggregator;
pub mod fetch;
pub mod reader;
pub mod writer;

pub use etl_core as core;
