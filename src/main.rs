use clap::Parser;
use lapdata_processor::cli::{self, Args};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Create cancellation token for coordinating graceful shutdown
        let cancellation_token = CancellationToken::new();

        let shutdown_token = cancellation_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nReceived CTRL+C, abandoning the file in progress and stopping...");
                shutdown_token.cancel();
            }
        });

        cli::run(args, cancellation_token).await
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("lapdata - Lap Telemetry Resampler");
    println!("=================================");
    println!();
    println!("Resample raw lap recordings (track position vs. elapsed time) onto a");
    println!("uniform position grid for lap time interpolation.");
    println!();
    println!("USAGE:");
    println!("    lapdata <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Convert every file in <base>/raw into <base>/<file>");
    println!("    inspect     Summarise processed lap files");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Process with the default layout (PluginsData/KLPlugins/DynLeaderboards/laps_data):");
    println!("    lapdata process");
    println!();
    println!("    # Custom location and a coarser grid:");
    println!("    lapdata process --base-path ./laps_data --pos-delta 0.01");
    println!();
    println!("    # Lap times and the time at half distance:");
    println!("    lapdata inspect --base-path ./laps_data --position 0.5");
    println!();
    println!("For detailed help on any command, use:");
    println!("    lapdata <COMMAND> --help");
}
