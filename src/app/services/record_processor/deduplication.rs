//! Row deduplication
//!
//! Extracts occasionally report the same `(occupation, industry, area)` more
//! than once. The first row seen wins; later repeats are discarded.

use crate::models::Row;
use std::collections::HashSet;
use tracing::debug;

use super::stats::ProcessingStats;

/// Keep the first-seen row per `(occupation_code, industry_code, area_code)`
///
/// Input order is preserved for the rows that survive.
pub fn deduplicate_rows(rows: Vec<Row>, stats: &mut ProcessingStats) -> Vec<Row> {
    let input_count = rows.len();
    let mut seen: HashSet<(String, String, String)> = HashSet::with_capacity(input_count);
    let mut deduplicated = Vec::with_capacity(input_count);

    for row in rows {
        let key = (
            row.occupation_code.clone(),
            row.industry_code.clone(),
            row.area_code.clone(),
        );
        if seen.insert(key) {
            deduplicated.push(row);
        } else {
            debug!(
                "Discarding duplicate row for {:?} ({})",
                row.dedup_key(),
                row.metric_value
            );
        }
    }

    let (reduction, removed) = get_deduplication_metrics(input_count, deduplicated.len());
    stats.duplicates_removed += removed;
    if removed > 0 {
        debug!(
            "Deduplication removed {} rows ({:.1}%), {} remaining",
            removed,
            reduction,
            deduplicated.len()
        );
    }

    deduplicated
}

/// Returns `(reduction_percentage, rows_removed)`
pub fn get_deduplication_metrics(input_count: usize, output_count: usize) -> (f64, usize) {
    let rows_removed = input_count.saturating_sub(output_count);
    let reduction_percentage = if input_count > 0 {
        (rows_removed as f64 / input_count as f64) * 100.0
    } else {
        0.0
    };

    (reduction_percentage, rows_removed)
}
