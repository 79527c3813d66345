//! File discovery module for raw lap recordings
//!
//! Lists the lap data files waiting in the raw directory. Only regular
//! files directly inside that directory with the configured extension are
//! picked up; the result is sorted so batches run in a stable order.

use crate::error::{LapDataError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File discovery component for the raw directory
#[derive(Debug)]
pub struct FileDiscovery {
    raw_path: PathBuf,
    extension: String,
}

impl FileDiscovery {
    /// Create a new file discovery instance
    pub fn new(raw_path: PathBuf, extension: impl Into<String>) -> Self {
        Self {
            raw_path,
            extension: extension.into(),
        }
    }

    /// Directory being scanned
    pub fn raw_path(&self) -> &Path {
        &self.raw_path
    }

    /// Discover all lap files in the raw directory
    ///
    /// ```text
    /// laps_data/
    ///   raw/
    ///     Silverstone_GT3.txt   <- discovered
    ///     Spa_GT4.txt           <- discovered
    ///     notes.md              <- ignored
    ///     old/                  <- ignored
    /// ```
    pub async fn discover_lap_files(&self) -> Result<Vec<PathBuf>> {
        if !self.raw_path.is_dir() {
            return Err(LapDataError::DirectoryNotFound {
                path: self.raw_path.clone(),
            });
        }

        debug!("Searching for lap files in: {}", self.raw_path.display());

        let mut files = Vec::new();
        let mut dir = fs::read_dir(&self.raw_path).await?;

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && has_extension(&path, &self.extension) {
                files.push(path);
            }
        }

        files.sort();
        debug!("Found {} lap files", files.len());

        Ok(files)
    }
}

/// Check if a path has the given extension (case sensitive)
fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}
