//! Core data structures for lap data processing.
//!
//! Defines the trace types flowing through the resampler, lap file naming,
//! and the statistics reported at the end of a batch.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One recorded sample: fractional lap position and elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub position: f64,
    pub time: f64,
}

impl RawSample {
    pub fn new(position: f64, time: f64) -> Self {
        Self { position, time }
    }
}

/// Samples in recording order, not necessarily sorted by position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTrace {
    pub positions: Vec<f64>,
    pub times: Vec<f64>,
}

impl RawTrace {
    pub fn new(positions: Vec<f64>, times: Vec<f64>) -> Self {
        debug_assert_eq!(positions.len(), times.len());
        Self { positions, times }
    }

    pub fn from_samples(samples: &[RawSample]) -> Self {
        let (positions, times) = samples.iter().map(|s| (s.position, s.time)).unzip();
        Self { positions, times }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = RawSample> + '_ {
        self.positions
            .iter()
            .zip(&self.times)
            .map(|(&position, &time)| RawSample { position, time })
    }
}

/// A deduplicated, truncated and validated trace.
///
/// Adjacent positions always differ and times are strictly increasing.
/// Only the resampler constructs one.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTrace {
    pub(crate) positions: Vec<f64>,
    pub(crate) times: Vec<f64>,
}

impl CleanedTrace {
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn first_position(&self) -> f64 {
        self.positions[0]
    }

    pub fn last_position(&self) -> f64 {
        self.positions[self.positions.len() - 1]
    }
}

/// Interpolated times on the uniform position grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResampledTrace {
    pub positions: Vec<f64>,
    pub times: Vec<f64>,
}

impl ResampledTrace {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.positions.iter().copied().zip(self.times.iter().copied())
    }
}

/// Track and car class encoded in a lap file name (`{track}_{class}.txt`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LapFileName {
    pub track: String,
    pub car_class: Option<String>,
}

impl LapFileName {
    /// Split the file stem at its last underscore
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        if stem.is_empty() {
            return None;
        }

        let name = match stem.rsplit_once('_') {
            Some((track, class)) if !track.is_empty() && !class.is_empty() => Self {
                track: track.to_string(),
                car_class: Some(class.to_string()),
            },
            _ => Self {
                track: stem.to_string(),
                car_class: None,
            },
        };
        Some(name)
    }
}

impl std::fmt::Display for LapFileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.car_class {
            Some(class) => write!(f, "{} / {}", self.track, class),
            None => write!(f, "{}", self.track),
        }
    }
}

/// A file the batch could not convert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Processing statistics
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub files_discovered: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_rows: usize,
    pub failures: Vec<FileFailure>,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    pub fn record_success(&mut self, rows: usize) {
        self.files_processed += 1;
        self.total_rows += rows;
    }

    pub fn record_failure(&mut self, path: PathBuf, message: String) {
        self.files_failed += 1;
        self.failures.push(FileFailure { path, message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lap_file_name_with_class() {
        let name = LapFileName::from_path(Path::new("raw/Silverstone_GT3.txt")).unwrap();
        assert_eq!(name.track, "Silverstone");
        assert_eq!(name.car_class.as_deref(), Some("GT3"));
        assert_eq!(name.to_string(), "Silverstone / GT3");
    }

    #[test]
    fn test_lap_file_name_splits_at_last_underscore() {
        let name = LapFileName::from_path(Path::new("Zandvoort_2019_CUP21.txt")).unwrap();
        assert_eq!(name.track, "Zandvoort_2019");
        assert_eq!(name.car_class.as_deref(), Some("CUP21"));
    }

    #[test]
    fn test_lap_file_name_without_class() {
        let name = LapFileName::from_path(Path::new("Monza.txt")).unwrap();
        assert_eq!(name.track, "Monza");
        assert_eq!(name.car_class, None);

        let name = LapFileName::from_path(Path::new("Monza_.txt")).unwrap();
        assert_eq!(name.track, "Monza_");
        assert_eq!(name.car_class, None);
    }

    #[test]
    fn test_raw_trace_from_samples() {
        let samples = [RawSample::new(0.0, 0.0), RawSample::new(0.5, 10.0)];
        let trace = RawTrace::from_samples(&samples);
        assert_eq!(trace.positions, vec![0.0, 0.5]);
        assert_eq!(trace.times, vec![0.0, 10.0]);
        assert_eq!(trace.samples().collect::<Vec<_>>(), samples);
    }

    #[test]
    fn test_stats_recording() {
        let mut stats = ProcessingStats::default();
        stats.record_success(201);
        stats.record_failure(PathBuf::from("bad.txt"), "boom".to_string());

        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.total_rows, 201);
        assert_eq!(stats.failures[0].path, PathBuf::from("bad.txt"));
    }
}
