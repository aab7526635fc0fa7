//! Tests for the record processor module
//!
//! Unit tests for each pipeline stage plus end-to-end dataset runs.

pub mod deduplication_tests;
pub mod processor_tests;
pub mod stats_tests;

// Test helper functions and fixtures
use crate::app::services::crosswalk::{CrosswalkEngine, TransformationGroup};
use crate::app::services::record_processor::RecordProcessor;
use crate::metric_catalog::MetricCatalog;
use crate::models::{Partition, RawRow, Row, SourceDataset};
use std::sync::Arc;

/// Create a typed row for metric `01`
pub fn create_test_row(occupation: &str, industry: &str, area: &str, value: f64) -> Row {
    Row {
        occupation_code: occupation.to_string(),
        industry_code: industry.to_string(),
        area_code: area.to_string(),
        metric_type: "01".to_string(),
        metric_value: value,
    }
}

/// Create a national cross-industry row for metric `01`
pub fn create_national_row(occupation: &str, value: f64) -> Row {
    create_test_row(occupation, "000000", "N0000000", value)
}

/// Create a raw national row with employment and median wage
pub fn create_raw_row(occ_code: &str, tot_emp: &str, a_median: &str) -> RawRow {
    RawRow::from_pairs([
        ("OCC_CODE", occ_code),
        ("TOT_EMP", tot_emp),
        ("A_MEDIAN", a_median),
    ])
}

pub fn create_national_dataset(year: i32, rows: Vec<RawRow>) -> SourceDataset {
    SourceDataset::new(year, Partition::National, rows)
}

/// Processor for metrics `01` and `13` with the given rule groups
pub fn create_test_processor(groups: Vec<TransformationGroup>) -> RecordProcessor {
    let metrics = MetricCatalog::default()
        .select(&["01".to_string(), "13".to_string()])
        .unwrap();
    RecordProcessor::new(Arc::new(CrosswalkEngine::new(groups)), metrics)
}
