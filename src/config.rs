//! Configuration management and validation.
//!
//! Provides the run configuration for OEWS processing: worker count, the
//! metric types to emit, catalog overrides, year floors, and Parquet output
//! settings. Configuration is optionally read from a TOML file and then
//! overridden from the command line.

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_METRIC_TYPES};
use crate::constants::series_layout::METRIC_TYPE_WIDTH;
use crate::error::{OewsError, Result};
use crate::models::{DatasetKey, Partition};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported compression algorithms for parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Parquet output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub compression: CompressionAlgorithm,
    /// Write column statistics for query pruning
    pub enable_statistics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            compression: CompressionAlgorithm::Snappy,
            enable_statistics: true,
        }
    }
}

/// Earliest survey year processed per partition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YearFloors {
    pub national: Option<i32>,
    pub state: Option<i32>,
    pub metro: Option<i32>,
    pub combined: Option<i32>,
}

impl YearFloors {
    pub fn get(&self, partition: Partition) -> Option<i32> {
        match partition {
            Partition::National => self.national,
            Partition::State => self.state,
            Partition::Metro => self.metro,
            Partition::Combined => self.combined,
        }
    }

    pub fn set(&mut self, partition: Partition, year: i32) {
        let slot = match partition {
            Partition::National => &mut self.national,
            Partition::State => &mut self.state,
            Partition::Metro => &mut self.metro,
            Partition::Combined => &mut self.combined,
        };
        *slot = Some(year);
    }

    pub fn is_empty(&self) -> bool {
        Partition::ALL.iter().all(|p| self.get(*p).is_none())
    }
}

/// Global configuration for OEWS processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OewsConfig {
    /// Number of datasets processed concurrently
    pub workers: usize,

    /// Metric-type codes to emit, in output order
    pub metric_types: Vec<String>,

    /// Rule catalog to load instead of the bundled one
    pub rules_path: Option<PathBuf>,

    /// Metric catalog to load instead of the built-in one
    pub metrics_path: Option<PathBuf>,

    /// Earliest survey year processed for any partition
    pub min_year: Option<i32>,

    pub year_floors: YearFloors,

    /// Show progress bars while processing
    pub show_progress: bool,

    pub output: OutputConfig,
}

impl Default for OewsConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            metric_types: DEFAULT_METRIC_TYPES.iter().map(|c| c.to_string()).collect(),
            rules_path: None,
            metrics_path: None,
            min_year: None,
            year_floors: YearFloors::default(),
            show_progress: true,
            output: OutputConfig::default(),
        }
    }
}

impl OewsConfig {
    /// Default location of the user configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(OewsError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: OewsConfig = toml::from_str(&content).map_err(|e| OewsError::Configuration {
            message: format!("{}: {}", path.display(), e),
        })?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(OewsError::Configuration {
                message: "workers must be at least 1".to_string(),
            });
        }
        if self.metric_types.is_empty() {
            return Err(OewsError::Configuration {
                message: "at least one metric type must be selected".to_string(),
            });
        }
        if let Some(code) = self
            .metric_types
            .iter()
            .find(|code| code.len() != METRIC_TYPE_WIDTH)
        {
            return Err(OewsError::Configuration {
                message: format!(
                    "metric type '{}' must be {} characters",
                    code, METRIC_TYPE_WIDTH
                ),
            });
        }
        Ok(())
    }

    /// Whether a dataset passes the configured year floors
    pub fn includes(&self, key: &DatasetKey) -> bool {
        let above_min = self.min_year.is_none_or(|min| key.year >= min);
        let above_floor = self
            .year_floors
            .get(key.partition)
            .is_none_or(|floor| key.year >= floor);
        above_min && above_floor
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_metric_types(mut self, metric_types: Vec<String>) -> Self {
        self.metric_types = metric_types;
        self
    }

    pub fn with_rules_path(mut self, path: PathBuf) -> Self {
        self.rules_path = Some(path);
        self
    }

    pub fn with_metrics_path(mut self, path: PathBuf) -> Self {
        self.metrics_path = Some(path);
        self
    }

    pub fn with_min_year(mut self, year: i32) -> Self {
        self.min_year = Some(year);
        self
    }

    pub fn with_year_floor(mut self, partition: Partition, year: i32) -> Self {
        self.year_floors.set(partition, year);
        self
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.output.compression = compression;
        self
    }

    /// Disable progress bars (quiet mode and tests)
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }
}
