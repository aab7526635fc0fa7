//! Core data structures and types for OEWS processing.
//!
//! Defines dataset partitions, the loosely typed raw row used at the
//! ingestion boundary, the typed rows that flow through the pipeline stages,
//! and the finalized records handed to the sink.

use crate::constants::ANNUAL_PERIOD;
use crate::error::RowError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Survey extract partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    National,
    State,
    Metro,
    /// All geographies in one file, distinguished by an area type column
    Combined,
}

impl Partition {
    pub const ALL: [Partition; 4] = [
        Partition::National,
        Partition::State,
        Partition::Metro,
        Partition::Combined,
    ];

    /// Detect the partition from a source folder name
    pub fn from_folder_name(name: &str) -> Option<Self> {
        use crate::constants::partition_folders;

        let name = name.to_lowercase();
        let name = name.as_str();
        if partition_folders::NATIONAL.contains(&name) {
            Some(Partition::National)
        } else if partition_folders::STATE.contains(&name) {
            Some(Partition::State)
        } else if partition_folders::METRO.contains(&name) {
            Some(Partition::Metro)
        } else if partition_folders::COMBINED.contains(&name) {
            Some(Partition::Combined)
        } else {
            None
        }
    }

    /// Detect the partition from the parent folder of a source file
    pub fn from_path(path: &Path) -> Option<Self> {
        path.parent()
            .and_then(|parent| parent.file_name())
            .and_then(|name| name.to_str())
            .and_then(Self::from_folder_name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::National => "national",
            Partition::State => "state",
            Partition::Metro => "metro",
            Partition::Combined => "combined",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one year/partition dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasetKey {
    pub year: i32,
    pub partition: Partition,
}

impl DatasetKey {
    pub fn new(year: i32, partition: Partition) -> Self {
        Self { year, partition }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.year, self.partition)
    }
}

/// Normalize a source column header (`"occ code"` -> `"OCC_CODE"`)
pub fn normalize_column_name(name: &str) -> String {
    name.trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}

/// A source row before classification
///
/// Field names are normalized on insert; empty values are treated as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    fields: BTreeMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut row = Self::new();
        for (name, value) in pairs {
            row.insert(name.as_ref(), value);
        }
        row
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if !value.is_empty() {
            self.fields
                .insert(normalize_column_name(name), value.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Get a field that the row cannot be classified without
    pub fn require(&self, name: &str) -> std::result::Result<&str, RowError> {
        self.get(name)
            .ok_or_else(|| RowError::MissingField(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One year/partition worth of raw rows
#[derive(Debug, Clone)]
pub struct SourceDataset {
    pub key: DatasetKey,
    pub rows: Vec<RawRow>,
    /// Whether the source carried an industry column at all
    pub has_industry_column: bool,
}

impl SourceDataset {
    pub fn new(year: i32, partition: Partition, rows: Vec<RawRow>) -> Self {
        let has_industry_column = rows
            .iter()
            .any(|row| row.get(crate::constants::columns::INDUSTRY).is_some());
        Self {
            key: DatasetKey::new(year, partition),
            rows,
            has_industry_column,
        }
    }
}

/// Contextual metadata needed to classify a raw row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationContext {
    pub year: i32,
    pub partition: Partition,
    pub has_industry_column: bool,
}

/// A raw row with its normalized codes attached
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    pub occupation_code: String,
    pub industry_code: String,
    pub area_code: String,
    pub fields: RawRow,
}

/// A single typed observation for one metric type
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub occupation_code: String,
    pub industry_code: String,
    pub area_code: String,
    pub metric_type: String,
    pub metric_value: f64,
}

impl Row {
    /// Copy of this row reported under a different occupation code
    pub fn with_occupation_code(&self, occupation_code: impl Into<String>) -> Self {
        Self {
            occupation_code: occupation_code.into(),
            ..self.clone()
        }
    }

    /// Key under which duplicate reporting rows collapse
    pub fn dedup_key(&self) -> (&str, &str, &str) {
        (
            self.occupation_code.as_str(),
            self.industry_code.as_str(),
            self.area_code.as_str(),
        )
    }

    /// Whether the occupation code is a directly observed leaf
    pub fn is_leaf(&self) -> bool {
        is_leaf_code(&self.occupation_code)
    }
}

/// Leaf codes never end in the group digit
pub fn is_leaf_code(code: &str) -> bool {
    !code.ends_with(crate::constants::GROUP_DIGIT)
}

/// Number of trailing group digits in an occupation code
pub fn trailing_zero_count(code: &str) -> usize {
    code.chars()
        .rev()
        .take_while(|c| *c == crate::constants::GROUP_DIGIT)
        .count()
}

/// How values of one metric type combine into a group value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationFn {
    Sum,
    Mean,
}

impl AggregationFn {
    /// Combine values; `None` for an empty input
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let total: f64 = values.iter().sum();
        match self {
            AggregationFn::Sum => Some(total),
            AggregationFn::Mean => Some(total / values.len() as f64),
        }
    }
}

impl fmt::Display for AggregationFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationFn::Sum => f.write_str("sum"),
            AggregationFn::Mean => f.write_str("mean"),
        }
    }
}

/// A finalized observation destined for the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub series_id: String,
    pub year: i32,
    pub period: String,
    pub observation_date: NaiveDate,
    pub value: f64,
}

impl SeriesRecord {
    /// Annual record dated January 1st of the survey year
    pub fn annual(series_id: impl Into<String>, year: i32, value: f64) -> Option<Self> {
        let observation_date = NaiveDate::from_ymd_opt(year, 1, 1)?;
        Some(Self {
            series_id: series_id.into(),
            year,
            period: ANNUAL_PERIOD.to_string(),
            observation_date,
            value,
        })
    }

    /// Primary key of the record in the store
    pub fn store_key(&self) -> (String, NaiveDate) {
        (self.series_id.clone(), self.observation_date)
    }
}
