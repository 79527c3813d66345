//! Command-line interface components.

use crate::config::{BoundaryNormalization, ProcessorConfig, ResampleConfig, TrailingBoundaryCheck};
use crate::constants::DEFAULT_POS_DELTA;
use crate::error::LapDataError;
use crate::interpolator::LapInterpolator;
use crate::models::ProcessingStats;
use crate::processor::LapDataProcessor;
use crate::processor::discovery::FileDiscovery;
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "lapdata")]
#[command(about = "Resample raw lap telemetry onto a uniform track position grid")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert every raw recording into a resampled lap file
    Process(ProcessArgs),
    /// Summarise processed lap files
    Inspect(InspectArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ProcessArgs {
    /// Directory receiving processed files; raw recordings are read from its raw subdirectory
    #[arg(short, long, value_name = "PATH")]
    pub base_path: Option<PathBuf>,

    /// Name of the subdirectory holding raw recordings
    #[arg(long, value_name = "NAME")]
    pub raw_dir: Option<String>,

    /// Step of the output position grid
    #[arg(long, default_value_t = DEFAULT_POS_DELTA)]
    pub pos_delta: f64,

    /// Files processed at once (0 = one per CPU core)
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Rewrite a leading position of exactly 1 to 0 and a trailing 0 to 1
    #[arg(long)]
    pub fix_boundary_normalization: bool,

    /// Accept traces ending past the line for any track with a known offset
    #[arg(long)]
    pub exempt_known_tracks: bool,
}

#[derive(ClapArgs, Debug)]
pub struct InspectArgs {
    /// Directory holding processed lap files
    #[arg(short, long, value_name = "PATH")]
    pub base_path: Option<PathBuf>,

    /// Also print the interpolated time at this track position
    #[arg(short, long)]
    pub position: Option<f64>,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl ProcessArgs {
    /// Build the processor configuration from defaults and flags
    pub fn to_config(&self, show_progress: bool) -> ProcessorConfig {
        let mut config = ProcessorConfig::default()
            .with_max_concurrent_files(self.jobs)
            .with_progress(show_progress);

        if let Some(base_path) = &self.base_path {
            config = config.with_base_path(base_path);
        }
        if let Some(raw_dir) = &self.raw_dir {
            config = config.with_raw_dir_name(raw_dir);
        }

        let mut resample = ResampleConfig::default().with_pos_delta(self.pos_delta);
        if self.fix_boundary_normalization {
            resample = resample.with_boundary_normalization(BoundaryNormalization::Apply);
        }
        if self.exempt_known_tracks {
            resample = resample.with_trailing_check(TrailingBoundaryCheck::ExemptKnownTracks);
        }

        config.with_resample(resample)
    }
}

/// Set up structured logging based on CLI arguments
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lapdata_processor={}", log_level)));

    // A second initialisation (e.g. from tests) is not an error worth reporting
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Run the selected command
pub async fn run(args: Args, cancel: CancellationToken) -> Result<()> {
    setup_logging(&args);
    let show_progress = args.show_progress();

    match args.command {
        Some(Commands::Process(process_args)) => {
            let stats = run_process(&process_args, show_progress, cancel).await?;
            if show_progress {
                print_summary(&stats);
            }
            Ok(())
        }
        Some(Commands::Inspect(inspect_args)) => run_inspect(&inspect_args).await,
        None => Ok(()),
    }
}

/// Process all raw recordings
pub async fn run_process(
    args: &ProcessArgs,
    show_progress: bool,
    cancel: CancellationToken,
) -> std::result::Result<ProcessingStats, LapDataError> {
    let config = args.to_config(show_progress);
    debug!("Process configuration: {:?}", config);

    let processor = LapDataProcessor::new(config)?;
    processor.process(cancel).await
}

/// Print a summary of processed lap files
pub async fn run_inspect(args: &InspectArgs) -> Result<()> {
    let base_path = args
        .base_path
        .clone()
        .unwrap_or_else(|| ProcessorConfig::default().base_path);

    let discovery = FileDiscovery::new(base_path.clone(), crate::constants::LAP_FILE_EXTENSION);
    let files = discovery
        .discover_lap_files()
        .await
        .with_context(|| format!("Failed to list lap files in {}", base_path.display()))?;
    info!("Inspecting {} lap files", files.len());

    println!(
        "{} {}",
        "Lap files in".bright_green().bold(),
        base_path.display()
    );

    for path in files {
        let lap = match LapInterpolator::from_file(&path) {
            Ok(lap) => lap,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                println!("  {} {}", "✗".red(), e);
                continue;
            }
        };

        let label = lap
            .name()
            .map(|name| name.to_string())
            .unwrap_or_else(|| path.display().to_string());
        let mut line = format!(
            "  {} {:<30} {:>5} samples  lap time {:.3}",
            "✓".green(),
            label,
            lap.len(),
            lap.lap_time()
        );
        if let Some(position) = args.position {
            line.push_str(&format!("  t({:.3}) = {:.3}", position, lap.time_at(position)));
        }
        println!("{}", line);
    }

    Ok(())
}

fn print_summary(stats: &ProcessingStats) {
    println!();
    println!("{}", "Processing complete".bright_green().bold());
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white().bold()
    );
    let failed = stats.files_failed.to_string();
    println!(
        "  {} {}",
        "Files failed:".bright_cyan(),
        if stats.files_failed > 0 {
            failed.bright_red().bold()
        } else {
            failed.bright_white().bold()
        }
    );
    println!(
        "  {} {}",
        "Rows written:".bright_cyan(),
        stats.total_rows.to_string().bright_white()
    );
    println!(
        "  {} {} ms",
        "Elapsed:".bright_cyan(),
        stats.processing_time_ms
    );

    for failure in &stats.failures {
        println!(
            "  {} {}\n    {}",
            "ERROR:".bright_red().bold(),
            failure.path.display(),
            failure.message
        );
    }
}
