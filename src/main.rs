use clap::Parser;
use oews_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result,
            signal = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                match signal {
                    Ok(()) => Err(anyhow::anyhow!("Processing interrupted by user")),
                    Err(e) => Err(anyhow::anyhow!("Failed to listen for CTRL+C: {}", e)),
                }
            }
        }
    });

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

/// Show help information when no subcommand is provided
fn show_help_and_commands() {
    println!("OEWS Processor - Occupational Employment Series Reconciler");
    println!("==========================================================");
    println!();
    println!("Reconcile yearly occupational employment survey extracts into one");
    println!("consistent, identifier-keyed time series.");
    println!();
    println!("USAGE:");
    println!("    oews-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process         Process survey extracts into Parquet (main command)");
    println!("    validate-rules  Check a crosswalk rule catalog for ambiguity");
    println!("    help            Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Process every extract under ./data into ./output:");
    println!("    oews-processor process ./data --output ./output");
    println!();
    println!("    # Employment and median wage only, printed as a summary:");
    println!("    oews-processor process ./data --metrics 01,13 --format summary");
    println!();
    println!("    # Validate a custom rule catalog:");
    println!("    oews-processor validate-rules my_rules.toml");
    println!();
    println!("For detailed help on any command, use:");
    println!("    oews-processor <COMMAND> --help");
}
