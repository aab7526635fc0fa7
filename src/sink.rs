//! Output sinks for finalized records.
//!
//! The orchestrator hands each dataset's records and series descriptors to a
//! [`RecordSink`] in `(year, partition)` order. Records are keyed by
//! `(series_id, observation_date)`; a later write for the same key replaces
//! the earlier one and is counted as an overwrite.

use crate::app::services::series_id::SeriesDescriptor;
use crate::config::OutputConfig;
use crate::constants::{SERIES_OUTPUT_FILENAME, VALUES_OUTPUT_FILENAME};
use crate::error::Result;
use crate::models::SeriesRecord;
use chrono::{Datelike, NaiveDate};
use polars::prelude::{
    Column, DataFrame, DataType, IntoColumn, NamedFrom, ParquetWriter, Series, StatisticsOptions,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// `num_days_from_ce` of 1970-01-01
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Polars `Date` physical value
fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Destination for processed records
pub trait RecordSink {
    fn write_records(&mut self, records: &[SeriesRecord]) -> Result<()>;

    fn write_series(&mut self, series: &[SeriesDescriptor]) -> Result<()>;

    /// Flush buffered output; returns the number of records written
    fn finish(&mut self) -> Result<usize>;
}

/// In-memory store with last-writer-wins semantics
#[derive(Debug, Default)]
pub struct MemorySink {
    records: BTreeMap<(String, NaiveDate), SeriesRecord>,
    series: BTreeMap<String, SeriesDescriptor>,
    overwrites: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> impl Iterator<Item = &SeriesRecord> {
        self.records.values()
    }

    pub fn series(&self) -> impl Iterator<Item = &SeriesDescriptor> {
        self.series.values()
    }

    pub fn get(&self, series_id: &str, date: NaiveDate) -> Option<&SeriesRecord> {
        self.records.get(&(series_id.to_string(), date))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes that replaced an existing record
    pub fn overwrites(&self) -> usize {
        self.overwrites
    }
}

impl RecordSink for MemorySink {
    fn write_records(&mut self, records: &[SeriesRecord]) -> Result<()> {
        for record in records {
            if self
                .records
                .insert(record.store_key(), record.clone())
                .is_some()
            {
                self.overwrites += 1;
            }
        }
        Ok(())
    }

    fn write_series(&mut self, series: &[SeriesDescriptor]) -> Result<()> {
        for descriptor in series {
            self.series
                .entry(descriptor.code.clone())
                .or_insert_with(|| descriptor.clone());
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<usize> {
        if self.overwrites > 0 {
            warn!(
                "{} records were overwritten by later datasets",
                self.overwrites
            );
        }
        Ok(self.records.len())
    }
}

/// Buffers records in memory and writes `values.parquet` and
/// `series.parquet` on [`finish`](RecordSink::finish)
#[derive(Debug)]
pub struct ParquetSink {
    output_dir: PathBuf,
    options: OutputConfig,
    buffer: MemorySink,
}

impl ParquetSink {
    pub fn new(output_dir: PathBuf, options: OutputConfig) -> Result<Self> {
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            options,
            buffer: MemorySink::new(),
        })
    }

    pub fn values_path(&self) -> PathBuf {
        self.output_dir.join(VALUES_OUTPUT_FILENAME)
    }

    pub fn series_path(&self) -> PathBuf {
        self.output_dir.join(SERIES_OUTPUT_FILENAME)
    }

    fn values_frame(&self) -> Result<DataFrame> {
        let records: Vec<&SeriesRecord> = self.buffer.records().collect();

        let series_code: Vec<&str> = records.iter().map(|r| r.series_id.as_str()).collect();
        let year: Vec<i32> = records.iter().map(|r| r.year).collect();
        let period: Vec<&str> = records.iter().map(|r| r.period.as_str()).collect();
        let days: Vec<i32> = records
            .iter()
            .map(|r| days_since_epoch(r.observation_date))
            .collect();
        let value: Vec<f64> = records.iter().map(|r| r.value).collect();

        let data_date = Series::new("data_date".into(), days).cast(&DataType::Date)?;

        Ok(DataFrame::new(vec![
            Column::new("series_code".into(), series_code),
            Column::new("year".into(), year),
            Column::new("period".into(), period),
            data_date.into_column(),
            Column::new("value".into(), value),
        ])?)
    }

    fn series_frame(&self) -> Result<DataFrame> {
        let series: Vec<&SeriesDescriptor> = self.buffer.series().collect();
        let column = |name: &str, field: fn(&SeriesDescriptor) -> &str| {
            let values: Vec<&str> = series.iter().map(|&s| field(s)).collect();
            Column::new(name.into(), values)
        };

        Ok(DataFrame::new(vec![
            column("code", |s| &s.code),
            column("occupation_code", |s| &s.occupation_code),
            column("industry_code", |s| &s.industry_code),
            column("area_code", |s| &s.area_code),
            column("data_type", |s| &s.metric_type),
        ])?)
    }

    fn write_frame(&self, mut df: DataFrame, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let statistics = if self.options.enable_statistics {
            StatisticsOptions::full()
        } else {
            StatisticsOptions::empty()
        };

        ParquetWriter::new(file)
            .with_compression(self.options.compression.to_polars_compression())
            .with_statistics(statistics)
            .finish(&mut df)?;

        debug!("Wrote {} rows to {}", df.height(), path.display());
        Ok(())
    }
}

impl RecordSink for ParquetSink {
    fn write_records(&mut self, records: &[SeriesRecord]) -> Result<()> {
        self.buffer.write_records(records)
    }

    fn write_series(&mut self, series: &[SeriesDescriptor]) -> Result<()> {
        self.buffer.write_series(series)
    }

    fn finish(&mut self) -> Result<usize> {
        let written = self.buffer.finish()?;

        self.write_frame(self.values_frame()?, &self.values_path())?;
        self.write_frame(self.series_frame()?, &self.series_path())?;

        info!(
            "Wrote {} records and {} series to {}",
            written,
            self.buffer.series.len(),
            self.output_dir.display()
        );
        Ok(written)
    }
}
