//! Record processing for one year/partition dataset
//!
//! Takes the raw rows of a source extract and produces the annual series
//! records and series descriptors for every configured metric type.
//!
//! # Architecture
//!
//! - [`processor`] - `RecordProcessor` and the per-dataset pipeline
//! - [`deduplication`] - first-seen deduplication per `(occupation, industry, area)`
//! - [`aggregation`] - series encoding, consolidation and group recomputation
//! - [`stats`] - processing statistics and result structures
//!
//! # Processing Pipeline
//!
//! 1. **Classification**: derive normalized codes, dropping rows that fail
//! 2. **Degrouping**: apply exact-year corrections
//! 3. **Deduplication**: keep the first row reported for each key
//! 4. **Reconciliation**: apply revision crosswalks
//! 5. **Consolidation**: combine rows merged onto one series identifier
//! 6. **Aggregation**: recompute every group value from its leaves
//!
//! # Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use oews_processor::app::services::crosswalk::RuleCatalog;
//! use oews_processor::app::services::record_processor::RecordProcessor;
//! use oews_processor::metric_catalog::MetricCatalog;
//! use oews_processor::models::{Partition, RawRow, SourceDataset};
//!
//! # fn example() -> oews_processor::Result<()> {
//! let engine = Arc::new(RuleCatalog::builtin()?.into_engine());
//! let metrics = MetricCatalog::default().select(&["01".to_string()])?;
//! let processor = RecordProcessor::new(engine, metrics);
//!
//! let rows = vec![RawRow::from_pairs([("OCC_CODE", "29-1141"), ("TOT_EMP", "1,200")])];
//! let dataset = SourceDataset::new(2019, Partition::National, rows);
//!
//! let result = processor.process_dataset(&dataset)?;
//! println!("{}", result.summary());
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod deduplication;
pub mod processor;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use aggregation::{SeriesTable, consolidate, encode_row, recompute_aggregates};
pub use deduplication::{deduplicate_rows, get_deduplication_metrics};
pub use processor::{RecordProcessor, parse_metric_value};
pub use stats::{ProcessingResult, ProcessingStats};
