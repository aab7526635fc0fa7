//! Code classification for raw survey rows
//!
//! Derives the normalized occupation, industry and area codes of a raw row.
//! Classification is a pure function of the row and its dataset context; a
//! row that cannot be classified yields a [`RowError`] and is dropped by the
//! caller.
//!
//! - [`industry`] - industry notation variants
//! - [`area`] - partition and area-type dependent geography codes

pub mod area;
pub mod industry;

use crate::constants::columns;
use crate::constants::series_layout::OCCUPATION_WIDTH;
use crate::error::RowError;
use crate::models::{ClassificationContext, ClassifiedRow, RawRow};

pub use area::{AreaType, area_code_for};
pub use industry::{industry_code_for, normalize_industry_code};

/// Strip SOC hyphens and require six digits (`"15-1121"` -> `"151121"`)
pub fn normalize_occupation_code(raw: &str) -> Result<String, RowError> {
    let code: String = raw.trim().chars().filter(|c| *c != '-').collect();
    if code.len() != OCCUPATION_WIDTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(RowError::MalformedOccupationCode(raw.trim().to_string()));
    }
    Ok(code)
}

/// Classifies raw rows into normalized codes
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeClassifier;

impl CodeClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Attach normalized codes to a raw row
    pub fn classify(
        &self,
        row: RawRow,
        context: &ClassificationContext,
    ) -> Result<ClassifiedRow, RowError> {
        let occupation_code = normalize_occupation_code(row.require(columns::OCCUPATION)?)?;
        let industry_code =
            industry_code_for(row.get(columns::INDUSTRY), context.has_industry_column)?;
        let area_code = area_code_for(&row, context.partition)?;

        Ok(ClassifiedRow {
            occupation_code,
            industry_code,
            area_code,
            fields: row,
        })
    }
}
