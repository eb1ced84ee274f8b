//! Runtime layer for the data automation service.
//!
//! Drives a single pipeline run from an explicit [`PipelineConfig`] and an
//! injected clock.
//!
//! [`PipelineConfig`]: etl_core::settings::PipelineConfig

pub mod pipeline;

pub use etl_core as core;
pub use etl_data as data;
