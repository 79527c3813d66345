//! Lap Data Processor Library
//!
//! Converts raw lap telemetry recordings (fractional track position against
//! elapsed time) into lap files sampled on a uniform position grid.
//!
//! This library provides tools for:
//! - Reading and writing `position;time` lap data files
//! - Cleaning recordings (duplicate positions, restarts mid-file)
//! - Resampling by linear interpolation with per-track alignment offsets
//! - Batch conversion of a directory with per-file error isolation
//! - Looking up elapsed time by position in processed laps

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod interpolator;
pub mod lapfile;
pub mod models;
pub mod processor;
pub mod resample;

// Re-export commonly used types
pub use config::{ProcessorConfig, ResampleConfig};
pub use error::{LapDataError, Result};
pub use interpolator::LapInterpolator;
pub use models::{ProcessingStats, RawTrace, ResampledTrace};
pub use processor::LapDataProcessor;
