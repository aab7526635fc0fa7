//! OEWS Processor Library
//!
//! Reconciles year-by-year occupational employment survey extracts into one
//! consistent time series keyed by fixed-width series identifiers.
//!
//! This library provides tools for:
//! - Classifying raw extract rows into canonical industry, area and occupation codes
//! - Remapping historical occupation codes through a validated rule catalog
//! - Recomputing group aggregates from detailed occupations
//! - Encoding and decoding 25-character series identifiers
//! - Writing the resulting series table to Parquet

pub mod config;
pub mod constants;
pub mod error;
pub mod metric_catalog;
pub mod models;
pub mod processor;
pub mod sink;
pub mod source;

// Core application modules
pub mod app {
    pub mod services {
        pub mod code_classifier;
        pub mod crosswalk;
        pub mod record_processor;
        pub mod series_id;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::services::crosswalk::{CrosswalkEngine, RuleCatalog};
pub use app::services::record_processor::{ProcessingResult, ProcessingStats, RecordProcessor};
pub use app::services::series_id::{SeriesDescriptor, SeriesId};
pub use config::OewsConfig;
pub use error::{OewsError, Result, RowError};
pub use metric_catalog::{MetricCatalog, MetricType};
pub use models::{DatasetKey, Partition, RawRow, SeriesRecord, SourceDataset};
pub use processor::{PipelineProcessor, RunSummary};
pub use sink::{MemorySink, ParquetSink, RecordSink};
