//! Command-line argument definitions for the OEWS processor
//!
//! This module defines the CLI interface using the clap derive API.

use crate::config::{CompressionAlgorithm, OewsConfig};
use crate::error::{OewsError, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the OEWS processor
///
/// Reconciles year-by-year occupational employment survey extracts into one
/// identifier-keyed time series.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "oews-processor",
    version,
    about = "Reconcile occupational employment survey extracts into a consistent time series",
    long_about = "Reads yearly OEWS CSV extracts (national, state, metro and combined), \
                  remaps historical occupation codes onto the current taxonomy, recomputes \
                  group aggregates from detailed occupations and writes one series table \
                  keyed by 25-character series identifiers."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Process survey extracts into series records
    Process(ProcessArgs),
    /// Load a rule catalog and report whether it is valid
    ValidateRules(ValidateRulesArgs),
}

/// Output format for the process command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Write values.parquet and series.parquet
    Parquet,
    /// Process in memory and print a summary only
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompressionArg {
    Snappy,
    Zstd,
    Lz4,
    None,
}

impl From<CompressionArg> for CompressionAlgorithm {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Snappy => CompressionAlgorithm::Snappy,
            CompressionArg::Zstd => CompressionAlgorithm::Zstd,
            CompressionArg::Lz4 => CompressionAlgorithm::Lz4,
            CompressionArg::None => CompressionAlgorithm::Uncompressed,
        }
    }
}

/// Arguments for the process command
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Directory holding the partition folders (nat/, state/, metro/, full/)
    #[arg(value_name = "INPUT", default_value = ".")]
    pub input_path: PathBuf,

    /// Output directory for the Parquet tables
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        default_value = "output",
        help = "Output directory for generated Parquet files"
    )]
    pub output_path: PathBuf,

    /// TOML configuration file
    ///
    /// If not specified, looks for the user config file
    /// (e.g. ~/.config/oews-processor/config.toml).
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Rule catalog replacing the bundled crosswalk rules
    #[arg(long = "rules", value_name = "FILE")]
    pub rules_file: Option<PathBuf>,

    /// Metric catalog replacing the built-in metric definitions
    #[arg(long = "metric-catalog", value_name = "FILE")]
    pub metric_catalog: Option<PathBuf>,

    /// Metric type codes to emit (comma-separated)
    #[arg(
        short = 'm',
        long = "metrics",
        value_name = "LIST",
        value_delimiter = ',',
        help = "Comma-separated metric type codes, e.g. 01,13"
    )]
    pub metrics: Option<Vec<String>>,

    /// Number of datasets processed concurrently
    #[arg(short = 'j', long = "workers", value_name = "COUNT")]
    pub workers: Option<usize>,

    /// Skip survey years before this one
    #[arg(long = "min-year", value_name = "YEAR")]
    pub min_year: Option<i32>,

    #[arg(long = "format", value_enum, default_value = "parquet")]
    pub format: OutputFormat,

    #[arg(long = "compression", value_enum)]
    pub compression: Option<CompressionArg>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the validate-rules command
#[derive(Debug, Clone, Parser)]
pub struct ValidateRulesArgs {
    /// Rule catalog to validate
    #[arg(value_name = "FILE")]
    pub rules_file: PathBuf,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity"
    )]
    pub verbose: u8,
}

impl ProcessArgs {
    /// Check arguments that clap cannot validate on its own
    pub fn validate(&self) -> Result<()> {
        if !self.input_path.is_dir() {
            return Err(OewsError::InputNotFound {
                path: self.input_path.clone(),
            });
        }
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(OewsError::Configuration {
                    message: format!("Config file does not exist: {}", config_file.display()),
                });
            }
        }
        if self.workers == Some(0) {
            return Err(OewsError::Configuration {
                message: "Number of workers must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            verbosity_level(self.verbose)
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Layer command-line overrides on top of a loaded configuration
    pub fn apply_to(&self, mut config: OewsConfig) -> OewsConfig {
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(metrics) = &self.metrics {
            config = config.with_metric_types(metrics.clone());
        }
        if let Some(path) = &self.rules_file {
            config = config.with_rules_path(path.clone());
        }
        if let Some(path) = &self.metric_catalog {
            config = config.with_metrics_path(path.clone());
        }
        if let Some(year) = self.min_year {
            config = config.with_min_year(year);
        }
        if let Some(compression) = self.compression {
            config = config.with_compression(compression.into());
        }
        if !self.show_progress() {
            config = config.without_progress();
        }
        config
    }
}

impl ValidateRulesArgs {
    pub fn get_log_level(&self) -> &'static str {
        verbosity_level(self.verbose)
    }
}

fn verbosity_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
