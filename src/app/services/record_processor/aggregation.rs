//! Series encoding, consolidation and group recomputation
//!
//! Rows are keyed by series identifier in a [`SeriesTable`]. Published group
//! values are not trusted: after a crosswalk the leaves under a group may have
//! changed, so every group code is recomputed from the true leaves beneath it.
//!
//! For depth `k` in `1..=4`, a leaf contributes to the code formed by zeroing
//! its last `k` digits, but only when that code has exactly `k` trailing
//! zeros. Leaf `111011` therefore feeds `111010`, `111000` (at depth 3, not
//! 2) and `110000`, and never feeds the same group twice.

use crate::app::services::series_id::{self, SeriesId};
use crate::constants::{GROUP_DIGIT, MAX_AGGREGATION_DEPTH, SERIES_PREFIX};
use crate::error::Result;
use crate::models::{AggregationFn, Row, SeriesRecord, trailing_zero_count};
use std::collections::BTreeMap;
use tracing::debug;

use super::stats::ProcessingStats;

/// Rows keyed by series identifier, in identifier order
pub type SeriesTable = BTreeMap<SeriesId, Row>;

pub fn encode_row(row: &Row) -> Result<SeriesId> {
    series_id::encode(
        SERIES_PREFIX,
        &row.area_code,
        &row.industry_code,
        &row.occupation_code,
        &row.metric_type,
    )
}

/// Encode every row; a width violation aborts the dataset
pub fn encode_rows(rows: Vec<Row>) -> Result<Vec<(SeriesId, Row)>> {
    rows.into_iter()
        .map(|row| Ok((encode_row(&row)?, row)))
        .collect()
}

/// Combine rows that share a series identifier
///
/// Distinct source codes merged onto one target code by a crosswalk end up
/// under one identifier; their values are combined with `aggregation`.
pub fn consolidate(
    encoded: Vec<(SeriesId, Row)>,
    aggregation: AggregationFn,
    stats: &mut ProcessingStats,
) -> SeriesTable {
    let mut grouped: BTreeMap<SeriesId, (Row, Vec<f64>)> = BTreeMap::new();
    for (id, row) in encoded {
        let value = row.metric_value;
        grouped
            .entry(id)
            .or_insert_with(|| (row, Vec::new()))
            .1
            .push(value);
    }

    grouped
        .into_iter()
        .map(|(id, (mut row, values))| {
            if values.len() > 1 {
                stats.merged += values.len() - 1;
                debug!("Consolidated {} rows into {}", values.len(), id);
            }
            if let Some(value) = aggregation.apply(&values) {
                row.metric_value = value;
            }
            (id, row)
        })
        .collect()
}

/// Group code of `leaf` at `depth`, if the depth is exact for that leaf
pub fn group_code_at_depth(leaf: &str, depth: usize) -> Option<String> {
    if depth == 0 || depth > leaf.len() {
        return None;
    }
    let prefix = &leaf[..leaf.len() - depth];
    let code = format!("{}{}", prefix, GROUP_DIGIT.to_string().repeat(depth));
    (trailing_zero_count(&code) == depth).then_some(code)
}

/// Recompute every group value from the leaves in `table`
///
/// Computed values replace source values for the same identifier; group rows
/// without any leaves keep their source value; missing group rows are added.
pub fn recompute_aggregates(
    mut table: SeriesTable,
    aggregation: AggregationFn,
    stats: &mut ProcessingStats,
) -> Result<SeriesTable> {
    let mut groups: BTreeMap<SeriesId, (Row, Vec<f64>)> = BTreeMap::new();

    for (id, leaf) in table.iter().filter(|(_, row)| row.is_leaf()) {
        for depth in 1..=MAX_AGGREGATION_DEPTH {
            let Some(code) = group_code_at_depth(&leaf.occupation_code, depth) else {
                continue;
            };
            let group_id = series_id::with_occupation(id, &code)?;
            groups
                .entry(group_id)
                .or_insert_with(|| (leaf.with_occupation_code(code), Vec::new()))
                .1
                .push(leaf.metric_value);
        }
    }

    for (group_id, (mut row, values)) in groups {
        let Some(value) = aggregation.apply(&values) else {
            continue;
        };
        row.metric_value = value;
        if table.insert(group_id, row).is_some() {
            stats.aggregates_replaced += 1;
        } else {
            stats.aggregates_created += 1;
        }
    }

    Ok(table)
}

/// Annual records for every row in the table
pub fn to_records(table: &SeriesTable, year: i32) -> Vec<SeriesRecord> {
    table
        .iter()
        .filter_map(|(id, row)| SeriesRecord::annual(id.as_str(), year, row.metric_value))
        .collect()
}
