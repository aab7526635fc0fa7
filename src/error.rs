//! Error handling for OEWS processing operations.
//!
//! Two layers of failure are modelled here. [`OewsError`] covers structural
//! and configuration problems (catalog ambiguity, identifier width drift,
//! unreadable sources) and aborts the run. [`RowError`] covers a single bad
//! source row; those rows are dropped and counted, and processing continues.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OewsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Input path not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Failed to parse catalog {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid occupation code '{code}' in rule group '{group}'")]
    InvalidRuleCode { group: String, code: String },

    #[error("Rule group '{group}' maps occupation code {code} more than once")]
    DuplicateFromCode { group: String, code: String },

    #[error(
        "Rule groups '{first_group}' and '{second_group}' share an applicability window but map {code} to {first_target} and {second_target}"
    )]
    ConflictingRules {
        code: String,
        first_group: String,
        second_group: String,
        first_target: String,
        second_target: String,
    },

    #[error("Rule catalog is not idempotent for year {year}: {code} maps to {once} then {twice}")]
    NonIdempotentCatalog {
        year: i32,
        code: String,
        once: String,
        twice: String,
    },

    #[error("Series identifier field '{field}' must be {expected} ASCII characters, got '{value}'")]
    IdentifierWidth {
        field: &'static str,
        expected: usize,
        value: String,
    },

    #[error("Invalid series identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    #[error("Unknown metric type: {code}")]
    UnknownMetricType { code: String },

    #[error("Processing failed for {year} {partition} dataset: {reason}")]
    ProcessingFailed {
        year: i32,
        partition: String,
        reason: String,
    },

    #[error("Dataset worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, OewsError>;

/// Reasons a single source row is excluded from processing
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowError {
    #[error("missing field {0}")]
    MissingField(String),

    #[error("unrecognized industry code '{0}'")]
    UnrecognizedIndustryCode(String),

    #[error("unrecognized area type '{0}'")]
    UnrecognizedAreaType(String),

    #[error("malformed area number '{0}'")]
    MalformedArea(String),

    #[error("malformed occupation code '{0}'")]
    MalformedOccupationCode(String),

    #[error("malformed metric value '{0}'")]
    MalformedMetric(String),
}

impl RowError {
    /// Short stable label used to bucket dropped-row counts
    pub fn kind(&self) -> &'static str {
        match self {
            RowError::MissingField(_) => "missing_field",
            RowError::UnrecognizedIndustryCode(_) => "industry_code",
            RowError::UnrecognizedAreaType(_) => "area_type",
            RowError::MalformedArea(_) => "area",
            RowError::MalformedOccupationCode(_) => "occupation_code",
            RowError::MalformedMetric(_) => "metric_value",
        }
    }
}
