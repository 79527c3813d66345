//! Resampling of raw lap traces onto a uniform position grid.
//!
//! A raw recording is cleaned (consecutive duplicate positions dropped,
//! everything after the first time reversal discarded), validated, rotated
//! when it started just before the start/finish line, and evaluated by
//! linear interpolation at positions `0, d, 2d, ...` up to `1 + d`
//! (exclusive). Recordings that started before the line have their grid
//! shifted by a per-track constant so the output lines up with the game's
//! own position origin.

use crate::config::{BoundaryNormalization, ResampleConfig, TrailingBoundaryCheck, file_name_of};
use crate::constants::{
    DEDUP_SENTINEL, TRAILING_END_THRESHOLD, WRAP_START_THRESHOLD, WRAPPED_GRID_OFFSET,
    track_offsets,
};
use crate::error::{LapDataError, Result};
use crate::models::{CleanedTrace, RawTrace, ResampledTrace};
use std::path::Path;
use tracing::{debug, trace};

/// Resample one raw trace read from `path`.
///
/// `path` is only used in error messages and, through its file name, to
/// detect the track.
pub fn resample(raw: &RawTrace, path: &Path, config: &ResampleConfig) -> Result<ResampledTrace> {
    let deduped = deduplicate(raw);
    let truncated = truncate_at_wraparound(&deduped);
    let mut cleaned = validate(truncated, path)?;
    normalize_boundaries(&mut cleaned, config.boundary_normalization);

    let first = cleaned.first_position();
    let last = cleaned.last_position();
    let starts_before_line = first > WRAP_START_THRESHOLD;

    debug!(
        "{}: {} raw samples, {} after cleaning, first pos {:.5}, last pos {:.5}",
        path.display(),
        raw.len(),
        cleaned.len(),
        first,
        last
    );

    let working_positions = if starts_before_line {
        rotate_positions(cleaned.positions(), first)
    } else {
        cleaned.positions().to_vec()
    };

    let mut grid = build_grid(config.pos_delta);
    let times: Vec<f64> = grid
        .iter()
        .map(|&x| interpolate(x, &working_positions, cleaned.times()))
        .collect();

    if starts_before_line {
        let track = config
            .track_for(path)
            .ok_or_else(|| LapDataError::UnsupportedTrack {
                path: path.to_path_buf(),
                first_position: first,
            })?;
        trace!("{}: shifting grid by {} ({})", path.display(), track.offset, track.name);
        shift_grid(&mut grid, track.offset);
    }

    if last < TRAILING_END_THRESHOLD && !trailing_exempt(path, config) {
        return Err(LapDataError::IncompleteTrace {
            path: path.to_path_buf(),
            last_position: last,
        });
    }

    Ok(ResampledTrace {
        positions: grid,
        times,
    })
}

/// Drop every sample whose position equals the next sample's position.
///
/// The final sample is compared against a sentinel of 1, so a trace ending
/// exactly on 1 loses its last sample.
pub fn deduplicate(raw: &RawTrace) -> RawTrace {
    let positions = &raw.positions;
    let keep = |i: usize| {
        let next = positions.get(i + 1).copied().unwrap_or(DEDUP_SENTINEL);
        next - positions[i] != 0.0
    };

    let (positions, times) = (0..raw.len())
        .filter(|&i| keep(i))
        .map(|i| (raw.positions[i], raw.times[i]))
        .unzip();
    RawTrace { positions, times }
}

/// Keep samples up to and including the last one before time first decreases.
pub fn truncate_at_wraparound(trace: &RawTrace) -> RawTrace {
    let end = trace
        .times
        .windows(2)
        .position(|pair| pair[1] < pair[0])
        .map_or(trace.len(), |i| i + 1);

    RawTrace {
        positions: trace.positions[..end].to_vec(),
        times: trace.times[..end].to_vec(),
    }
}

/// Check the cleaned-trace invariants and take ownership of the samples.
pub fn validate(trace: RawTrace, path: &Path) -> Result<CleanedTrace> {
    match trace.len() {
        0 => return Err(LapDataError::integrity(path, "no samples left after cleaning")),
        1 => return Err(LapDataError::integrity(path, "single sample left after cleaning")),
        _ => {}
    }

    // Both checks are written so that NaN differences fail too
    if trace
        .positions
        .windows(2)
        .any(|pair| !((pair[1] - pair[0]).abs() > 0.0))
    {
        return Err(LapDataError::integrity(path, "diff(pos) == 0"));
    }

    if trace.times.windows(2).any(|pair| !(pair[1] - pair[0] > 0.0)) {
        return Err(LapDataError::integrity(path, "diff(time) <= 0"));
    }

    Ok(CleanedTrace {
        positions: trace.positions,
        times: trace.times,
    })
}

/// Rewrite exact boundary positions when `mode` asks for it.
pub fn normalize_boundaries(trace: &mut CleanedTrace, mode: BoundaryNormalization) {
    if mode == BoundaryNormalization::Preserve {
        return;
    }

    if let Some(first) = trace.positions.first_mut() {
        if *first == 1.0 {
            *first = 0.0;
        }
    }
    if let Some(last) = trace.positions.last_mut() {
        if *last == 0.0 {
            *last = 1.0;
        }
    }
}

/// Rotate positions so the trace starts at (about) zero.
pub fn rotate_positions(positions: &[f64], first: f64) -> Vec<f64> {
    let shift = 1.0 - first;
    positions
        .iter()
        .map(|&p| {
            let rotated = p + shift;
            if rotated >= 1.0 { rotated - 1.0 } else { rotated }
        })
        .collect()
}

/// Grid positions `i * pos_delta` for `i` in `0..ceil((1 + pos_delta) / pos_delta)`.
pub fn build_grid(pos_delta: f64) -> Vec<f64> {
    let count = ((1.0 + pos_delta) / pos_delta).ceil().max(0.0) as usize;
    (0..count).map(|i| i as f64 * pos_delta).collect()
}

/// Piecewise linear interpolation of `(xp, fp)` at `x`.
///
/// `xp` is expected to be increasing. Queries outside `[xp[0], xp[n-1]]`
/// return the nearest endpoint value.
pub fn interpolate(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    debug_assert_eq!(xp.len(), fp.len());
    let n = xp.len();
    match n {
        0 => return f64::NAN,
        1 => return fp[0],
        _ => {}
    }

    if x.is_nan() {
        return x;
    }
    if x < xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }

    // Largest j with xp[j] <= x, always < n - 1 here
    let j = xp.partition_point(|&v| v <= x).saturating_sub(1).min(n - 2);
    if x == xp[j] {
        return fp[j];
    }

    let slope = (fp[j + 1] - fp[j]) / (xp[j + 1] - xp[j]);
    let value = slope * (x - xp[j]) + fp[j];
    if value.is_nan() {
        let value = slope * (x - xp[j + 1]) + fp[j + 1];
        if value.is_nan() && fp[j] == fp[j + 1] {
            return fp[j];
        }
        return value;
    }
    value
}

/// Subtract a track offset from every grid position, wrapping the ones that
/// end up at or below zero.
pub fn shift_grid(grid: &mut [f64], offset: f64) {
    for position in grid.iter_mut() {
        *position -= offset;
        if *position <= 0.0 {
            *position += WRAPPED_GRID_OFFSET;
        }
    }
}

/// Whether a trace ending just past the line is accepted for `path`.
fn trailing_exempt(path: &Path, config: &ResampleConfig) -> bool {
    match config.trailing_check {
        TrailingBoundaryCheck::SourceCompatible => {
            let file_name = file_name_of(path);
            file_name.contains(track_offsets::SILVERSTONE.0) && file_name.contains(track_offsets::SPA.0)
        }
        TrailingBoundaryCheck::ExemptKnownTracks => config.track_for(path).is_some(),
    }
}
