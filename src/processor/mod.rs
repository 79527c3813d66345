//! Batch processing engine.
//!
//! Discovers raw lap recordings, runs each one through read → resample →
//! write in its own failure scope, and collects successes and failures
//! separately. A bad file is logged and counted; it never stops the batch.

pub mod discovery;

#[cfg(test)]
pub mod tests;

use self::discovery::FileDiscovery;

use crate::config::ProcessorConfig;
use crate::error::{LapDataError, Result};
use crate::lapfile::{read_trace, write_trace};
use crate::models::{LapFileName, ProcessingStats};
use crate::resample::resample;

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::pin::pin;
use std::time::Instant;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Main processor for lap data conversion
#[derive(Debug)]
pub struct LapDataProcessor {
    config: ProcessorConfig,
    file_discovery: FileDiscovery,
}

impl LapDataProcessor {
    /// Create a new processor, validating the configuration
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        config.validate()?;
        let file_discovery = FileDiscovery::new(config.raw_path(), config.file_extension.clone());
        Ok(Self {
            config,
            file_discovery,
        })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process every discovered file.
    ///
    /// Returns an error only when the batch cannot run at all (missing raw
    /// directory) or is cancelled; per-file failures end up in the stats.
    pub async fn process(&self, cancel: CancellationToken) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        let verbose_output = self.config.show_progress;

        if verbose_output {
            println!("{}", "Starting lap data processing".bright_green().bold());
            println!(
                "  {} {}",
                "Input:".bright_cyan(),
                self.file_discovery.raw_path().display()
            );
            println!(
                "  {} {}",
                "Output:".bright_cyan(),
                self.config.base_path.display()
            );
        }

        // Step 1: Discover lap files
        let files = self.file_discovery.discover_lap_files().await?;
        info!(
            "Found {} lap files in {}",
            files.len(),
            self.file_discovery.raw_path().display()
        );
        if verbose_output {
            println!(
                "  {} {} lap files",
                "Found".bright_green(),
                files.len().to_string().bright_white().bold()
            );
        }

        let mut stats = ProcessingStats {
            files_discovered: files.len(),
            output_path: self.config.base_path.clone(),
            ..Default::default()
        };

        if files.is_empty() {
            stats.processing_time_ms = start_time.elapsed().as_millis();
            return Ok(stats);
        }

        // Step 2: Convert files, each in its own failure scope
        let progress_bar = verbose_output.then(|| {
            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        });

        let concurrent_limit = self.config.max_concurrent_files.min(files.len()).max(1);
        debug!("Processing with concurrency limit {}", concurrent_limit);

        let mut results = pin!(
            stream::iter(files)
                .map(|path| async move {
                    let result = self.process_file(&path).await;
                    (path, result)
                })
                .buffered(concurrent_limit)
        );

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    if let Some(pb) = &progress_bar {
                        pb.abandon_with_message("Interrupted");
                    }
                    return Err(LapDataError::ProcessingInterrupted {
                        reason: format!(
                            "cancelled after {} of {} files",
                            stats.files_processed + stats.files_failed,
                            stats.files_discovered
                        ),
                    });
                }
                next = results.next() => next,
            };

            let Some((path, result)) = next else {
                break;
            };

            if let Some(pb) = &progress_bar {
                pb.inc(1);
                if let Some(name) = path.file_name() {
                    pb.set_message(name.to_string_lossy().to_string());
                }
            }

            match result {
                Ok(rows) => {
                    debug!("Successfully processed: {} ({} rows)", path.display(), rows);
                    stats.record_success(rows);
                }
                Err(e) if e.is_per_file() => {
                    error!("Failed to process file {}: {}", path.display(), e);
                    stats.record_failure(path, e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(pb) = &progress_bar {
            pb.finish_with_message("Processing complete");
        }

        stats.processing_time_ms = start_time.elapsed().as_millis();
        info!(
            "Processed {} files ({} failed, {} rows) in {} ms",
            stats.files_processed, stats.files_failed, stats.total_rows, stats.processing_time_ms
        );

        Ok(stats)
    }

    /// Convert a single raw file and write the result; returns the row count.
    pub async fn process_file(&self, path: &Path) -> Result<usize> {
        let name = LapFileName::from_path(path);
        if let Some(name) = &name {
            debug!("Processing {} ({})", path.display(), name);
        }

        let input: PathBuf = path.to_path_buf();
        let resample_config = self.config.resample.clone();
        let resampled = task::spawn_blocking(move || {
            let raw = read_trace(&input)?;
            resample(&raw, &input, &resample_config)
        })
        .await
        .map_err(|e| LapDataError::TaskFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })??;

        let output_path = self.config.output_path_for(path);
        write_trace(&output_path, &resampled).await?;

        Ok(resampled.len())
    }
}
