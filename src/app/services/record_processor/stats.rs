//! Processing statistics and result structures for the dataset pipeline
//!
//! Counts are kept per dataset and merged into run totals by the orchestrator.

use crate::app::services::series_id::SeriesDescriptor;
use crate::error::RowError;
use crate::models::{DatasetKey, SeriesRecord};
use std::collections::BTreeMap;

/// Statistics for one dataset (or, after merging, a whole run)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingStats {
    /// Raw rows read from the source
    pub total_input: usize,
    /// Rows that classified cleanly
    pub classified: usize,
    /// Rows dropped, bucketed by [`RowError::kind`]
    pub dropped: BTreeMap<&'static str, usize>,
    /// Metric observations with a parsable value
    pub metric_rows: usize,
    /// Rows rewritten by degrouping corrections
    pub degrouped: usize,
    /// Rows discarded as repeats of an earlier `(occupation, industry, area)`
    pub duplicates_removed: usize,
    /// Rows rewritten by revision crosswalks
    pub remapped: usize,
    /// Rows folded into another row sharing its series identifier
    pub merged: usize,
    /// Group values computed where the source had none
    pub aggregates_created: usize,
    /// Group values computed over a published source value
    pub aggregates_replaced: usize,
    /// Records emitted
    pub final_output: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_drop(&mut self, error: &RowError) {
        *self.dropped.entry(error.kind()).or_insert(0) += 1;
    }

    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }

    pub fn dropped_for(&self, kind: &str) -> usize {
        self.dropped.get(kind).copied().unwrap_or(0)
    }

    /// Percentage of raw rows that classified
    pub fn classification_rate(&self) -> f64 {
        if self.total_input == 0 {
            100.0
        } else {
            (self.classified as f64 / self.total_input as f64) * 100.0
        }
    }

    pub fn aggregates_computed(&self) -> usize {
        self.aggregates_created + self.aggregates_replaced
    }

    /// Fold another dataset's counts into these
    pub fn merge(&mut self, other: &ProcessingStats) {
        self.total_input += other.total_input;
        self.classified += other.classified;
        for (kind, count) in &other.dropped {
            *self.dropped.entry(*kind).or_insert(0) += count;
        }
        self.metric_rows += other.metric_rows;
        self.degrouped += other.degrouped;
        self.duplicates_removed += other.duplicates_removed;
        self.remapped += other.remapped;
        self.merged += other.merged;
        self.aggregates_created += other.aggregates_created;
        self.aggregates_replaced += other.aggregates_replaced;
        self.final_output += other.final_output;
    }

    pub fn summary(&self) -> String {
        format!(
            "Processing Summary: {} rows -> {} records ({:.1}% classified) | \
             Dropped: {} | Duplicates: {} | Remapped: {} | Merged: {} | \
             Aggregates: {} ({} replaced)",
            self.total_input,
            self.final_output,
            self.classification_rate(),
            self.dropped_total(),
            self.duplicates_removed,
            self.degrouped + self.remapped,
            self.merged,
            self.aggregates_computed(),
            self.aggregates_replaced
        )
    }
}

/// Everything produced from one year/partition dataset
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub key: DatasetKey,
    pub records: Vec<SeriesRecord>,
    /// Distinct series referenced by `records`
    pub series: Vec<SeriesDescriptor>,
    pub stats: ProcessingStats,
}

impl ProcessingResult {
    pub fn new(
        key: DatasetKey,
        records: Vec<SeriesRecord>,
        series: Vec<SeriesDescriptor>,
        stats: ProcessingStats,
    ) -> Self {
        Self {
            key,
            records,
            series,
            stats,
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn summary(&self) -> String {
        format!("{}: {}", self.key, self.stats.summary())
    }
}
