//! Tests for row deduplication

use super::*;
use crate::app::services::record_processor::deduplication::{
    deduplicate_rows, get_deduplication_metrics,
};
use std::collections::HashSet;
use crate::app::services::record_processor::stats::ProcessingStats;

#[test]
fn test_deduplicate_rows_no_duplicates() {
    let mut stats = ProcessingStats::new();
    let rows = vec![
        create_national_row("151121", 1.0),
        create_national_row("151122", 2.0),
        create_test_row("151121", "000000", "S0600000", 3.0),
    ];

    let result = deduplicate_rows(rows.clone(), &mut stats);

    assert_eq!(result, rows);
    assert_eq!(stats.duplicates_removed, 0);
}

#[test]
fn test_deduplicate_rows_keeps_first_seen() {
    let mut stats = ProcessingStats::new();
    let rows = vec![
        create_national_row("151121", 100.0),
        create_national_row("151122", 50.0),
        create_national_row("151121", 999.0),
        create_national_row("151121", 7.0),
    ];

    let result = deduplicate_rows(rows, &mut stats);

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].occupation_code, "151121");
    assert_eq!(result[0].metric_value, 100.0);
    assert_eq!(result[1].occupation_code, "151122");
    assert_eq!(stats.duplicates_removed, 2);
}

#[test]
fn test_deduplicate_rows_at_most_one_per_key() {
    let mut stats = ProcessingStats::new();
    let mut rows = Vec::new();
    for i in 0..30 {
        let occ = format!("1511{:02}", i % 7 + 1);
        let area = if i % 2 == 0 { "N0000000" } else { "S0600000" };
        rows.push(create_test_row(&occ, "000000", area, i as f64));
    }

    let result = deduplicate_rows(rows, &mut stats);
    let keys: HashSet<_> = result.iter().map(|row| row.dedup_key()).collect();

    assert_eq!(keys.len(), result.len());
    assert_eq!(result.len() + stats.duplicates_removed, 30);
}

#[test]
fn test_industry_distinguishes_keys() {
    let mut stats = ProcessingStats::new();
    let rows = vec![
        create_test_row("151121", "000000", "N0000000", 1.0),
        create_test_row("151121", "541511", "N0000000", 2.0),
    ];
    assert_ne!(rows[0].dedup_key(), rows[1].dedup_key());
    assert_eq!(deduplicate_rows(rows, &mut stats).len(), 2);
}

#[test]
fn test_get_deduplication_metrics() {
    let (percentage, removed) = get_deduplication_metrics(200, 150);
    assert_eq!(removed, 50);
    assert!((percentage - 25.0).abs() < f64::EPSILON);

    let (percentage, removed) = get_deduplication_metrics(0, 0);
    assert_eq!(removed, 0);
    assert_eq!(percentage, 0.0);
}

#[test]
fn test_metric_type_does_not_distinguish_keys() {
    let mut stats = ProcessingStats::new();
    let a = create_national_row("151121", 1.0);
    let mut b = create_national_row("151121", 2.0);
    b.metric_type = "13".to_string();

    let result = deduplicate_rows(vec![a, b], &mut stats);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].metric_value, 1.0);
}
