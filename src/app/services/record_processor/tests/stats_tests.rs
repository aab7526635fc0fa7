//! Tests for processing statistics and result structures

use crate::app::services::record_processor::stats::{ProcessingResult, ProcessingStats};
use crate::error::RowError;
use crate::models::{DatasetKey, Partition, SeriesRecord};

#[test]
fn test_processing_stats_new() {
    let stats = ProcessingStats::new();

    assert_eq!(stats.total_input, 0);
    assert_eq!(stats.dropped_total(), 0);
    assert_eq!(stats.final_output, 0);
    assert_eq!(stats, ProcessingStats::default());
    assert_eq!(stats.classification_rate(), 100.0);
}

#[test]
fn test_record_drop_buckets_by_kind() {
    let mut stats = ProcessingStats::new();
    stats.record_drop(&RowError::MalformedMetric("*".to_string()));
    stats.record_drop(&RowError::MalformedMetric("#".to_string()));
    stats.record_drop(&RowError::UnrecognizedAreaType("9".to_string()));

    assert_eq!(stats.dropped_for("metric_value"), 2);
    assert_eq!(stats.dropped_for("area_type"), 1);
    assert_eq!(stats.dropped_for("industry_code"), 0);
    assert_eq!(stats.dropped_total(), 3);
}

#[test]
fn test_merge_accumulates() {
    let mut total = ProcessingStats::new();

    let mut first = ProcessingStats::new();
    first.total_input = 10;
    first.classified = 9;
    first.record_drop(&RowError::MalformedOccupationCode("x".to_string()));
    first.aggregates_created = 3;

    let mut second = ProcessingStats::new();
    second.total_input = 5;
    second.classified = 5;
    second.record_drop(&RowError::MalformedOccupationCode("y".to_string()));
    second.aggregates_replaced = 2;
    second.final_output = 7;

    total.merge(&first);
    total.merge(&second);

    assert_eq!(total.total_input, 15);
    assert_eq!(total.classified, 14);
    assert_eq!(total.dropped_for("occupation_code"), 2);
    assert_eq!(total.aggregates_computed(), 5);
    assert_eq!(total.final_output, 7);
}

#[test]
fn test_summary_mentions_counts() {
    let mut stats = ProcessingStats::new();
    stats.total_input = 4;
    stats.classified = 3;
    stats.final_output = 12;
    stats.duplicates_removed = 1;

    let summary = stats.summary();
    assert!(summary.contains("4 rows -> 12 records"));
    assert!(summary.contains("75.0% classified"));
    assert!(summary.contains("Duplicates: 1"));
}

#[test]
fn test_processing_result() {
    let key = DatasetKey::new(2015, Partition::Combined);
    let record = SeriesRecord::annual("OEUN000000000000015112101", 2015, 3.0).unwrap();
    let result = ProcessingResult::new(key, vec![record], Vec::new(), ProcessingStats::new());

    assert_eq!(result.record_count(), 1);
    assert!(result.summary().starts_with("2015 combined:"));
}
