//! Metric-type catalog.
//!
//! Maps each two-character metric-type code to the survey column it is read
//! from and the function that combines leaf values into group values.

use crate::error::{OewsError, Result};
use crate::models::AggregationFn;
use serde::{Deserialize, Serialize};

/// A column name that applies up to and including a survey year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOverride {
    pub through_year: i32,
    pub column: String,
}

/// One metric type published by the survey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricType {
    pub code: String,
    pub column: String,
    pub aggregation: AggregationFn,
    #[serde(default)]
    pub column_overrides: Vec<ColumnOverride>,
}

impl MetricType {
    pub fn new(code: &str, column: &str, aggregation: AggregationFn) -> Self {
        Self {
            code: code.to_string(),
            column: column.to_string(),
            aggregation,
            column_overrides: Vec::new(),
        }
    }

    pub fn with_override(mut self, through_year: i32, column: &str) -> Self {
        self.column_overrides.push(ColumnOverride {
            through_year,
            column: column.to_string(),
        });
        self
    }

    /// Source column holding this metric in a given survey year
    ///
    /// The override with the earliest `through_year` still covering `year` wins.
    pub fn column_for_year(&self, year: i32) -> &str {
        self.column_overrides
            .iter()
            .filter(|o| year <= o.through_year)
            .min_by_key(|o| o.through_year)
            .map(|o| o.column.as_str())
            .unwrap_or(&self.column)
    }
}

/// All metric types known to the processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCatalog {
    #[serde(rename = "metric")]
    metrics: Vec<MetricType>,
}

impl Default for MetricCatalog {
    fn default() -> Self {
        use AggregationFn::{Mean, Sum};

        // Annual percentile wages were published as "wpct" columns in the oldest extracts
        const LEGACY_THROUGH: i32 = 1999;

        Self {
            metrics: vec![
                MetricType::new("01", "TOT_EMP", Sum),
                MetricType::new("02", "EMP_PRSE", Mean),
                MetricType::new("03", "H_MEAN", Mean),
                MetricType::new("04", "A_MEAN", Mean),
                MetricType::new("05", "MEAN_PRSE", Mean),
                MetricType::new("06", "H_PCT10", Mean),
                MetricType::new("07", "H_PCT25", Mean),
                MetricType::new("08", "H_MEDIAN", Mean),
                MetricType::new("09", "H_PCT75", Mean),
                MetricType::new("10", "H_PCT90", Mean),
                MetricType::new("11", "A_PCT10", Mean).with_override(LEGACY_THROUGH, "A_WPCT10"),
                MetricType::new("12", "A_PCT25", Mean).with_override(LEGACY_THROUGH, "A_WPCT25"),
                MetricType::new("13", "A_MEDIAN", Mean),
                MetricType::new("14", "A_PCT75", Mean).with_override(LEGACY_THROUGH, "A_WPCT75"),
                MetricType::new("15", "A_PCT90", Mean).with_override(LEGACY_THROUGH, "A_WPCT90"),
            ],
        }
    }
}

impl MetricCatalog {
    pub fn new(metrics: Vec<MetricType>) -> Result<Self> {
        let catalog = Self { metrics };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Err(OewsError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, path)
    }

    /// Parse a catalog from TOML (`[[metric]]` tables)
    pub fn from_toml_str(content: &str, origin: &std::path::Path) -> Result<Self> {
        let catalog: Self = toml::from_str(content).map_err(|source| OewsError::CatalogParse {
            path: origin.to_path_buf(),
            source,
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        use crate::constants::series_layout::METRIC_TYPE_WIDTH;

        let mut seen = std::collections::HashSet::new();
        for metric in &self.metrics {
            if metric.code.len() != METRIC_TYPE_WIDTH || !metric.code.is_ascii() {
                return Err(OewsError::IdentifierWidth {
                    field: "metric_type",
                    expected: METRIC_TYPE_WIDTH,
                    value: metric.code.clone(),
                });
            }
            if !seen.insert(metric.code.as_str()) {
                return Err(OewsError::Configuration {
                    message: format!("Metric type {} is declared more than once", metric.code),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, code: &str) -> Result<&MetricType> {
        self.metrics
            .iter()
            .find(|m| m.code == code)
            .ok_or_else(|| OewsError::UnknownMetricType {
                code: code.to_string(),
            })
    }

    /// Resolve a list of codes, preserving the requested order
    pub fn select(&self, codes: &[String]) -> Result<Vec<MetricType>> {
        codes.iter().map(|code| self.get(code).cloned()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricType> {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
