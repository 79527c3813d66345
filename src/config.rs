//! Configuration management and validation.
//!
//! Provides the resampling parameters, the directory layout of a batch run,
//! and the switches that decide how two questionable behaviours of the
//! original converter are handled.

use crate::constants::{
    DEFAULT_BASE_PATH, DEFAULT_MAX_CONCURRENT_FILES, DEFAULT_POS_DELTA, LAP_FILE_EXTENSION,
    MAX_CONCURRENT_FILES_LIMIT, RAW_DIR_NAME, track_offsets,
};
use crate::error::{LapDataError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How a first position of exactly 1 (or a last position of exactly 0) is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryNormalization {
    /// Leave the positions untouched, matching files produced by the old converter
    #[default]
    Preserve,
    /// Rewrite a leading 1 to 0 and a trailing 0 to 1
    Apply,
}

/// Which files may end just past the start/finish line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrailingBoundaryCheck {
    /// Reject unless the path names both Silverstone and Spa (old converter behaviour)
    #[default]
    SourceCompatible,
    /// Reject unless the path names any track with a configured offset
    ExemptKnownTracks,
}

/// Grid alignment offset for one track, matched by substring of the file name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackOffset {
    pub name: String,
    pub offset: f64,
}

impl TrackOffset {
    pub fn new(name: impl Into<String>, offset: f64) -> Self {
        Self {
            name: name.into(),
            offset,
        }
    }
}

/// Parameters of a single resampling run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampleConfig {
    /// Step of the output position grid
    pub pos_delta: f64,

    /// Handling of exact 1/0 boundary positions
    pub boundary_normalization: BoundaryNormalization,

    /// Handling of traces ending just past the line
    pub trailing_check: TrailingBoundaryCheck,

    /// Per-track offsets, checked in order
    pub track_offsets: Vec<TrackOffset>,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            pos_delta: DEFAULT_POS_DELTA,
            boundary_normalization: BoundaryNormalization::default(),
            trailing_check: TrailingBoundaryCheck::default(),
            track_offsets: track_offsets::DEFAULTS
                .iter()
                .map(|&(name, offset)| TrackOffset::new(name, offset))
                .collect(),
        }
    }
}

impl ResampleConfig {
    /// Set the grid step
    pub fn with_pos_delta(mut self, pos_delta: f64) -> Self {
        self.pos_delta = pos_delta;
        self
    }

    /// Set the boundary normalization mode
    pub fn with_boundary_normalization(mut self, mode: BoundaryNormalization) -> Self {
        self.boundary_normalization = mode;
        self
    }

    /// Set the trailing boundary check mode
    pub fn with_trailing_check(mut self, mode: TrailingBoundaryCheck) -> Self {
        self.trailing_check = mode;
        self
    }

    /// Replace the track offset table
    pub fn with_track_offsets(mut self, offsets: Vec<TrackOffset>) -> Self {
        self.track_offsets = offsets;
        self
    }

    /// First configured track whose name occurs in the file name of `path`
    ///
    /// Parent directories are ignored, so a base path such as `~/Spaghetti`
    /// never selects a track.
    pub fn track_for(&self, path: &Path) -> Option<&TrackOffset> {
        let file_name = file_name_of(path);
        self.track_offsets
            .iter()
            .find(|track| file_name.contains(track.name.as_str()))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.pos_delta.is_finite() || self.pos_delta <= 0.0 || self.pos_delta >= 1.0 {
            return Err(LapDataError::configuration(format!(
                "pos_delta must be in (0, 1), got {}",
                self.pos_delta
            )));
        }

        for track in &self.track_offsets {
            if track.name.is_empty() {
                return Err(LapDataError::configuration("Track name cannot be empty"));
            }
            if !track.offset.is_finite() {
                return Err(LapDataError::configuration(format!(
                    "Offset for track {} must be finite",
                    track.name
                )));
            }
        }

        Ok(())
    }
}

/// File name component of `path`, empty when there is none
pub(crate) fn file_name_of(path: &Path) -> std::borrow::Cow<'_, str> {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default()
}

/// Global configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Directory processed files are written to
    pub base_path: PathBuf,

    /// Name of the subdirectory of `base_path` holding raw recordings
    pub raw_dir_name: String,

    /// Extension of input files (without the dot)
    pub file_extension: String,

    /// Maximum concurrent file processing
    pub max_concurrent_files: usize,

    /// Show a progress bar while processing
    pub show_progress: bool,

    /// Resampling parameters
    pub resample: ResampleConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.iter().collect(),
            raw_dir_name: RAW_DIR_NAME.to_string(),
            file_extension: LAP_FILE_EXTENSION.to_string(),
            max_concurrent_files: DEFAULT_MAX_CONCURRENT_FILES,
            show_progress: false,
            resample: ResampleConfig::default(),
        }
    }
}

impl ProcessorConfig {
    /// Create configuration rooted at `base_path`
    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Set the raw subdirectory name
    pub fn with_raw_dir_name(mut self, name: impl Into<String>) -> Self {
        self.raw_dir_name = name.into();
        self
    }

    /// Set maximum concurrent files; 0 uses one per CPU core
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = if max_files == 0 {
            num_cpus::get()
        } else {
            max_files
        };
        self
    }

    /// Enable the progress bar
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Configure resampling
    pub fn with_resample(mut self, resample: ResampleConfig) -> Self {
        self.resample = resample;
        self
    }

    /// Directory scanned for input files
    pub fn raw_path(&self) -> PathBuf {
        self.base_path.join(&self.raw_dir_name)
    }

    /// Where the processed version of `input` is written
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        match input.file_name() {
            Some(name) => self.base_path.join(name),
            None => self.base_path.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.raw_dir_name.is_empty() {
            return Err(LapDataError::configuration(
                "Raw directory name cannot be empty",
            ));
        }

        if self.max_concurrent_files == 0 {
            return Err(LapDataError::configuration(
                "Maximum concurrent files must be greater than 0",
            ));
        }

        if self.max_concurrent_files > MAX_CONCURRENT_FILES_LIMIT {
            return Err(LapDataError::configuration(format!(
                "Maximum concurrent files cannot exceed {}",
                MAX_CONCURRENT_FILES_LIMIT
            )));
        }

        self.resample.validate()?;

        debug!("Configuration validated: {:?}", self);
        Ok(())
    }
}
