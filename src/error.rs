//! Error handling for lap data processing operations.
//!
//! Per-file errors (malformed rows, integrity violations, unsupported tracks,
//! incomplete traces) are recovered at the batch boundary. Directory,
//! configuration and interruption errors abort the batch.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LapDataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed input in file: {path} (line {line}) - {reason}")]
    MalformedInput {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Data integrity violated in file: {path} - {reason}")]
    DataIntegrity { path: PathBuf, reason: String },

    #[error("Unsupported track for wraparound correction: {path} starts at pos {first_position}")]
    UnsupportedTrack { path: PathBuf, first_position: f64 },

    #[error("Incomplete trace in file: {path} ends at pos {last_position:.5}")]
    IncompleteTrace { path: PathBuf, last_position: f64 },

    #[error("Worker task failed for file: {path} - {reason}")]
    TaskFailed { path: PathBuf, reason: String },

    #[error("Directory not found at path: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl LapDataError {
    /// Create a data integrity error for `path`
    pub fn integrity(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DataIntegrity {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the batch can continue after this error
    pub fn is_per_file(&self) -> bool {
        !matches!(
            self,
            Self::DirectoryNotFound { .. }
                | Self::Configuration { .. }
                | Self::ProcessingInterrupted { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LapDataError>;
