//! Per-dataset pipeline
//!
//! Turns one year/partition [`SourceDataset`] into series records. For each
//! configured metric type the stages are:
//!
//! 1. metric rows (unparsable values dropped)
//! 2. degroup
//! 3. deduplicate
//! 4. reconcile
//! 5. encode and consolidate
//! 6. recompute group aggregates
//! 7. annual records

use crate::app::services::code_classifier::CodeClassifier;
use crate::app::services::crosswalk::CrosswalkEngine;
use crate::app::services::series_id::SeriesDescriptor;
use crate::constants::SUPPRESSION_MARKERS;
use crate::error::{Result, RowError};
use crate::metric_catalog::MetricType;
use crate::models::{ClassificationContext, ClassifiedRow, Row, SourceDataset, normalize_column_name};
use std::sync::Arc;
use tracing::{debug, info};

use super::{
    aggregation::{SeriesTable, consolidate, encode_rows, recompute_aggregates, to_records},
    deduplication::deduplicate_rows,
    stats::{ProcessingResult, ProcessingStats},
};

/// Parse a published metric value
///
/// Thousands separators are accepted; suppression markers and anything else
/// that is not a finite number are rejected.
pub fn parse_metric_value(raw: &str) -> std::result::Result<f64, RowError> {
    let trimmed = raw.trim();
    if SUPPRESSION_MARKERS.contains(&trimmed) {
        return Err(RowError::MalformedMetric(trimmed.to_string()));
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(RowError::MalformedMetric(trimmed.to_string())),
    }
}

#[derive(Debug, Clone)]
pub struct RecordProcessor {
    classifier: CodeClassifier,
    engine: Arc<CrosswalkEngine>,
    metrics: Vec<MetricType>,
}

impl RecordProcessor {
    pub fn new(engine: Arc<CrosswalkEngine>, metrics: Vec<MetricType>) -> Self {
        Self {
            classifier: CodeClassifier::new(),
            engine,
            metrics,
        }
    }

    pub fn metrics(&self) -> &[MetricType] {
        &self.metrics
    }

    pub fn engine(&self) -> &CrosswalkEngine {
        &self.engine
    }

    /// Run the full pipeline over one dataset
    pub fn process_dataset(&self, dataset: &SourceDataset) -> Result<ProcessingResult> {
        let key = dataset.key;
        let mut stats = ProcessingStats::new();
        stats.total_input = dataset.rows.len();

        info!(
            "Processing {} dataset: {} rows, {} metric types",
            key,
            dataset.rows.len(),
            self.metrics.len()
        );

        let classified = self.classify_rows(dataset, &mut stats);

        let mut records = Vec::new();
        let mut series = Vec::new();
        for metric in &self.metrics {
            let table = self.process_metric(&classified, key.year, metric, &mut stats)?;
            for id in table.keys() {
                series.push(SeriesDescriptor::from_id(id)?);
            }
            records.extend(to_records(&table, key.year));
        }
        stats.final_output = records.len();

        info!("{} complete: {}", key, stats.summary());

        Ok(ProcessingResult::new(key, records, series, stats))
    }

    /// Classify raw rows, dropping and counting the ones that fail
    pub fn classify_rows(
        &self,
        dataset: &SourceDataset,
        stats: &mut ProcessingStats,
    ) -> Vec<ClassifiedRow> {
        let context = ClassificationContext {
            year: dataset.key.year,
            partition: dataset.key.partition,
            has_industry_column: dataset.has_industry_column,
        };

        let mut classified = Vec::with_capacity(dataset.rows.len());
        for (index, raw) in dataset.rows.iter().enumerate() {
            match self.classifier.classify(raw.clone(), &context) {
                Ok(row) => classified.push(row),
                Err(error) => {
                    debug!("{} row {} dropped: {}", dataset.key, index, error);
                    stats.record_drop(&error);
                }
            }
        }
        stats.classified += classified.len();
        classified
    }

    /// Typed rows for one metric type; rows without a usable value are dropped
    pub fn metric_rows(
        &self,
        classified: &[ClassifiedRow],
        year: i32,
        metric: &MetricType,
        stats: &mut ProcessingStats,
    ) -> Vec<Row> {
        let column = normalize_column_name(metric.column_for_year(year));

        let mut rows = Vec::with_capacity(classified.len());
        for row in classified {
            let value = row
                .fields
                .require(&column)
                .and_then(parse_metric_value);
            match value {
                Ok(metric_value) => rows.push(Row {
                    occupation_code: row.occupation_code.clone(),
                    industry_code: row.industry_code.clone(),
                    area_code: row.area_code.clone(),
                    metric_type: metric.code.clone(),
                    metric_value,
                }),
                Err(error) => {
                    debug!(
                        "Metric {} dropped for {} {} {}: {}",
                        metric.code, row.occupation_code, row.industry_code, row.area_code, error
                    );
                    stats.record_drop(&error);
                }
            }
        }
        stats.metric_rows += rows.len();
        rows
    }

    /// Metric rows through crosswalk, consolidation and aggregation
    pub fn process_metric(
        &self,
        classified: &[ClassifiedRow],
        year: i32,
        metric: &MetricType,
        stats: &mut ProcessingStats,
    ) -> Result<SeriesTable> {
        let rows = self.metric_rows(classified, year, metric, stats);

        let degrouped = self.engine.degroup(&rows, year);
        stats.degrouped += degrouped.remapped_rows();

        let deduplicated = deduplicate_rows(degrouped.rows, stats);

        let reconciled = self.engine.reconcile(&deduplicated, year);
        stats.remapped += reconciled.remapped_rows();

        let encoded = encode_rows(reconciled.rows)?;
        let table = consolidate(encoded, metric.aggregation, stats);
        let table = recompute_aggregates(table, metric.aggregation, stats)?;

        debug!(
            "Metric {} ({}) for {}: {} series",
            metric.code,
            metric.aggregation,
            year,
            table.len()
        );

        Ok(table)
    }
}
