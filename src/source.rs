//! Source extract discovery and CSV reading.
//!
//! Extracts are laid out as `<input>/<partition-folder>/<year>.csv`. The
//! partition comes from the folder name and the survey year from the file
//! stem. Every column is read as a string; typing happens in the pipeline.

use crate::constants::SOURCE_EXTENSION;
use crate::error::{OewsError, Result};
use crate::models::{DatasetKey, Partition, RawRow, SourceDataset};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A discovered extract file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub key: DatasetKey,
}

/// Survey year encoded in a file stem (`2015.csv` -> 2015)
pub fn year_from_path(path: &Path) -> Option<i32> {
    let stem = path.file_stem()?.to_str()?;
    if stem.len() != 4 || !stem.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Find every extract under `input`, ordered by `(year, partition)`
///
/// Files in unknown folders or with non-numeric stems are skipped with a
/// warning. When two files resolve to the same dataset the first path in
/// lexical order is kept.
pub fn discover_sources(input: &Path) -> Result<Vec<SourceFile>> {
    if !input.is_dir() {
        return Err(OewsError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    info!("Scanning {} for survey extracts", input.display());

    let mut found: BTreeMap<DatasetKey, PathBuf> = BTreeMap::new();
    for entry in WalkDir::new(input)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != SOURCE_EXTENSION) {
            continue;
        }

        let Some(partition) = Partition::from_path(path) else {
            warn!("Skipping {}: unrecognized partition folder", path.display());
            continue;
        };
        let Some(year) = year_from_path(path) else {
            warn!("Skipping {}: file name is not a survey year", path.display());
            continue;
        };

        let key = DatasetKey::new(year, partition);
        if let Some(existing) = found.get(&key) {
            warn!(
                "Skipping {}: {} already provided by {}",
                path.display(),
                key,
                existing.display()
            );
            continue;
        }
        found.insert(key, path.to_path_buf());
    }

    info!("Discovered {} extracts", found.len());

    Ok(found
        .into_iter()
        .map(|(key, path)| SourceFile { path, key })
        .collect())
}

/// Read every row of a CSV extract as strings
pub fn read_csv_rows(path: &Path) -> Result<Vec<RawRow>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let mut rows = vec![RawRow::new(); df.height()];
    for column in df.get_columns() {
        let name = column.name().as_str();
        let values = column.str()?;
        for (row, value) in rows.iter_mut().zip(values.into_iter()) {
            if let Some(value) = value {
                row.insert(name, value);
            }
        }
    }

    debug!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(rows)
}

/// Load a discovered extract into a dataset
pub fn read_dataset(file: &SourceFile) -> Result<SourceDataset> {
    let rows = read_csv_rows(&file.path).map_err(|e| OewsError::ProcessingFailed {
        year: file.key.year,
        partition: file.key.partition.to_string(),
        reason: format!("failed to read {}: {}", file.path.display(), e),
    })?;
    Ok(SourceDataset::new(file.key.year, file.key.partition, rows))
}
