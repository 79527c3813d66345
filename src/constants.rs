//! Application constants for the lap data processor
//!
//! Default directory layout, resampling parameters and the per-track
//! alignment offsets used when a recording starts just before the
//! start/finish line.

// =============================================================================
// Directory Layout
// =============================================================================

/// Path components of the default base directory, relative to the working directory
pub const DEFAULT_BASE_PATH: &[&str] = &["PluginsData", "KLPlugins", "DynLeaderboards", "laps_data"];

/// Subdirectory of the base path holding unprocessed recordings
pub const RAW_DIR_NAME: &str = "raw";

/// Extension of lap data files (raw and processed)
pub const LAP_FILE_EXTENSION: &str = "txt";

// =============================================================================
// File Format
// =============================================================================

/// Field delimiter for both input and output rows
pub const FIELD_DELIMITER: u8 = b';';

/// Decimal digits written for every output value
pub const OUTPUT_PRECISION: usize = 8;

// =============================================================================
// Resampling
// =============================================================================

/// Default step of the output position grid
pub const DEFAULT_POS_DELTA: f64 = 0.005;

/// Sentinel compared against the final position during deduplication
pub const DEDUP_SENTINEL: f64 = 1.0;

/// A trace whose first position is above this started before the line
pub const WRAP_START_THRESHOLD: f64 = 0.9;

/// A trace whose last position is below this ran past the line
pub const TRAILING_END_THRESHOLD: f64 = 0.1;

/// Added to grid positions pushed to or below zero by a track offset
pub const WRAPPED_GRID_OFFSET: f64 = 1.000001;

/// Track name matched against file paths, with its grid alignment offset
pub mod track_offsets {
    pub const SILVERSTONE: (&str, f64) = ("Silverstone", 0.0209485);
    pub const SPA: (&str, f64) = ("Spa", 0.0036425);

    /// Checked in order; the first name contained in the path wins
    pub const DEFAULTS: &[(&str, f64)] = &[SILVERSTONE, SPA];
}

/// Offset added to every position read from a processed lap file, keyed by
/// the track part of the file name. Tracks not listed use 0.
pub mod spline_offsets {
    pub const SILVERSTONE: (&str, f64) = ("Silverstone", 0.0207);

    pub const DEFAULTS: &[(&str, f64)] = &[SILVERSTONE];
}

// =============================================================================
// Processing Defaults
// =============================================================================

/// Files processed at once; 1 keeps the batch strictly sequential
pub const DEFAULT_MAX_CONCURRENT_FILES: usize = 1;

/// Upper bound accepted for `--jobs`
pub const MAX_CONCURRENT_FILES_LIMIT: usize = 256;
