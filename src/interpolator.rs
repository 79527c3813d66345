//! Lookup of elapsed lap time by track position from processed lap files.
//!
//! Every position is moved by the track's spline offset first, the same
//! correction live position updates receive. Positions that end up above 1
//! (including the `1.000001` rows written after a track offset) are folded
//! back into `[0, 1]` and the samples re-sorted before interpolation.

use crate::constants::spline_offsets;
use crate::error::{LapDataError, Result};
use crate::lapfile::read_trace;
use crate::models::{LapFileName, RawTrace};
use crate::resample::interpolate;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LapInterpolator {
    source: PathBuf,
    positions: Vec<f64>,
    times: Vec<f64>,
    lap_time: f64,
    spline_offset: f64,
}

/// Spline position offset of `track`, 0 when it has none
pub fn spline_offset_for(track: &str) -> f64 {
    spline_offsets::DEFAULTS
        .iter()
        .find(|(name, _)| *name == track)
        .map_or(0.0, |&(_, offset)| offset)
}

impl LapInterpolator {
    /// Load a processed lap file
    pub fn from_file(path: &Path) -> Result<Self> {
        let trace = read_trace(path)?;
        Self::from_trace(&trace, path)
    }

    /// Build from already parsed samples; the track, and with it the spline
    /// offset, comes from the file name of `source`
    pub fn from_trace(trace: &RawTrace, source: &Path) -> Result<Self> {
        let offset = LapFileName::from_path(source).map_or(0.0, |name| spline_offset_for(&name.track));
        Self::from_trace_with_offset(trace, source, offset)
    }

    /// Build with an explicit spline offset added to every position
    pub fn from_trace_with_offset(trace: &RawTrace, source: &Path, spline_offset: f64) -> Result<Self> {
        let lap_time = *trace
            .times
            .last()
            .ok_or_else(|| LapDataError::integrity(source, "lap file has no samples"))?;

        let mut samples: Vec<(f64, f64)> = trace
            .samples()
            .map(|s| {
                let position = s.position + spline_offset;
                let position = if position > 1.0 { position - 1.0 } else { position };
                (position, s.time)
            })
            .collect();
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (positions, times) = samples.into_iter().unzip();
        debug!(
            "Built lap interpolator from {} (spline offset {})",
            source.display(),
            spline_offset
        );

        Ok(Self {
            source: source.to_path_buf(),
            positions,
            times,
            lap_time,
            spline_offset,
        })
    }

    /// Elapsed time at `position`, clamped to the first/last known sample
    pub fn time_at(&self, position: f64) -> f64 {
        interpolate(position, &self.positions, &self.times)
    }

    /// Time of the final sample in file order
    pub fn lap_time(&self) -> f64 {
        self.lap_time
    }

    pub fn spline_offset(&self) -> f64 {
        self.spline_offset
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn name(&self) -> Option<LapFileName> {
        LapFileName::from_path(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_time_at_interpolates_and_clamps() {
        let trace = RawTrace::new(vec![0.0, 0.5, 1.0], vec![0.0, 50.0, 100.0]);
        let lap = LapInterpolator::from_trace(&trace, Path::new("Monza_GT3.txt")).unwrap();

        assert_eq!(lap.len(), 3);
        assert_eq!(lap.lap_time(), 100.0);
        assert!((lap.time_at(0.25) - 25.0).abs() < 1e-9);
        assert_eq!(lap.time_at(-0.5), 0.0);
        assert_eq!(lap.time_at(2.0), 100.0);
    }

    #[test]
    fn test_positions_above_one_wrap() {
        // As written after a track offset: first row wrapped to just below 1
        let trace = RawTrace::new(vec![1.0000005, 0.2, 0.6], vec![0.0, 20.0, 60.0]);
        let lap = LapInterpolator::from_trace(&trace, Path::new("Spa_GT3.txt")).unwrap();

        assert_eq!(lap.lap_time(), 60.0);
        assert!((lap.positions[0] - 0.0000005).abs() < 1e-12);
        assert_eq!(lap.positions[1..], [0.2, 0.6]);
        assert_eq!(lap.times, vec![0.0, 20.0, 60.0]);
    }

    #[test]
    fn test_silverstone_positions_get_spline_offset() {
        let trace = RawTrace::new(vec![0.0, 0.5, 0.99], vec![0.0, 50.0, 99.0]);
        let lap = LapInterpolator::from_trace(&trace, Path::new("laps/Silverstone_GT3.txt")).unwrap();

        assert_eq!(lap.spline_offset(), 0.0207);
        assert_eq!(lap.lap_time(), 99.0);
        // 0.99 + 0.0207 wraps to the front
        assert!((lap.positions[0] - 0.0107).abs() < 1e-9);
        assert_eq!(lap.times, vec![99.0, 0.0, 50.0]);
        assert!((lap.time_at(0.5207) - 50.0).abs() < 1e-6);
        assert!((lap.time_at(0.2707) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_spline_offset_only_for_exact_track() {
        assert_eq!(spline_offset_for("Silverstone"), 0.0207);
        assert_eq!(spline_offset_for("Spa"), 0.0);
        assert_eq!(spline_offset_for("Silverstone_Classic"), 0.0);

        let trace = RawTrace::new(vec![0.0, 0.5], vec![0.0, 50.0]);
        let lap = LapInterpolator::from_trace(&trace, Path::new("Silverstone/Spa_GT3.txt")).unwrap();
        assert_eq!(lap.spline_offset(), 0.0);
        assert!((lap.time_at(0.25) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_trace_rejected() {
        let err = LapInterpolator::from_trace(&RawTrace::default(), Path::new("x.txt")).unwrap_err();
        assert!(matches!(err, LapDataError::DataIntegrity { .. }));
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Spa_GT4.txt");
        fs::write(&path, "0.00000000;0.00000000\n0.50000000;70.00000000\n1.00000000;140.00000000\n")
            .unwrap();

        let lap = LapInterpolator::from_file(&path).unwrap();
        assert_eq!(lap.lap_time(), 140.0);
        assert!((lap.time_at(0.75) - 105.0).abs() < 1e-9);

        let name = lap.name().unwrap();
        assert_eq!(name.track, "Spa");
        assert_eq!(name.car_class.as_deref(), Some("GT4"));
    }
}
