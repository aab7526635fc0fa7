//! Command implementations for the OEWS processor CLI
//!
//! Each subcommand sets up logging, builds its configuration and drives the
//! library. Errors are wrapped with `anyhow` context for the binary.

use crate::app::services::crosswalk::RuleCatalog;
use crate::cli::args::{Args, Commands, OutputFormat, ProcessArgs, ValidateRulesArgs};
use crate::config::OewsConfig;
use crate::processor::{PipelineProcessor, RunSummary};
use crate::sink::{MemorySink, ParquetSink};
use anyhow::{Context, Result};
use colored::*;
use tracing::{debug, info};

/// Dispatch to the selected subcommand
pub async fn run(args: Args) -> Result<()> {
    match args.command {
        Some(Commands::Process(process_args)) => {
            run_process(process_args).await?;
        }
        Some(Commands::ValidateRules(validate_args)) => run_validate_rules(validate_args)?,
        None => anyhow::bail!("no command given; run with --help for usage"),
    }
    Ok(())
}

/// Set up structured logging on stderr
pub fn setup_logging(log_level: &str, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("oews_processor={}", log_level)));

    let result = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    // A subscriber may already be installed when commands run in-process.
    if result.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}

/// Config file (explicit or default location) with CLI overrides applied
pub fn load_configuration(args: &ProcessArgs) -> Result<OewsConfig> {
    let base = match &args.config_file {
        Some(path) => OewsConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => OewsConfig::load_or_default().context("failed to load user config")?,
    };
    let config = args.apply_to(base);
    config.validate()?;
    Ok(config)
}

/// Process every extract under the input directory
pub async fn run_process(args: ProcessArgs) -> Result<RunSummary> {
    setup_logging(args.get_log_level(), args.quiet);
    info!("Starting OEWS processor");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(&args)?;
    debug!("Loaded configuration: {:?}", config);

    let output = config.output.clone();
    let processor = PipelineProcessor::new(args.input_path.clone(), config)
        .context("failed to initialize pipeline")?;

    let summary = match args.format {
        OutputFormat::Parquet => {
            let mut sink = ParquetSink::new(args.output_path.clone(), output)
                .with_context(|| format!("failed to prepare {}", args.output_path.display()))?;
            let summary = processor.process(&mut sink).await?;
            if args.show_progress() {
                println!(
                    "  {} {}, {}",
                    "Wrote".bright_green(),
                    sink.values_path().display(),
                    sink.series_path().display()
                );
            }
            summary
        }
        OutputFormat::Summary => {
            let mut sink = MemorySink::new();
            let summary = processor.process(&mut sink).await?;
            print_series_summary(&sink, &summary);
            summary
        }
    };

    Ok(summary)
}

fn print_series_summary(sink: &MemorySink, summary: &RunSummary) {
    println!("{}", summary.stats.summary());
    println!(
        "{} records across {} series ({} overwritten by later datasets)",
        sink.len(),
        sink.series().count(),
        sink.overwrites()
    );
}

/// Load a rule catalog and print its groups
pub fn run_validate_rules(args: ValidateRulesArgs) -> Result<()> {
    setup_logging(args.get_log_level(), false);

    let catalog = RuleCatalog::load(&args.rules_file)
        .with_context(|| format!("rule catalog {} is invalid", args.rules_file.display()))?;

    println!(
        "{} {} ({} groups, {} rules)",
        "Valid rule catalog:".bright_green().bold(),
        args.rules_file.display(),
        catalog.groups().len(),
        catalog.rule_count()
    );
    for group in catalog.groups() {
        let identities = group.rules().iter().filter(|rule| rule.is_identity()).count();
        println!(
            "  {} year {} {} [{} rules, {} identity]",
            group.name().bright_cyan(),
            group.comparison(),
            group.reference_year(),
            group.rules().len(),
            identities
        );
    }
    Ok(())
}
