//! Industry code normalization
//!
//! Extracts publish industries in three notations: a two-digit sector
//! (`"31"`), a hyphenated two-digit range (`"31-33"`) or a six-character
//! detailed code. All three are brought to a six-character code. Sector
//! `99` has no two-digit upper bound and is rejected.

use crate::constants::ALL_INDUSTRY_CODE;
use crate::constants::series_layout::INDUSTRY_WIDTH;
use crate::error::RowError;
use regex::Regex;
use std::sync::LazyLock;

static SECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{2})$").expect("valid sector pattern"));

static SECTOR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2})-([0-9]{2})$").expect("valid sector range pattern")
});

/// Normalize a raw industry value to a six-character code
pub fn normalize_industry_code(raw: &str) -> Result<String, RowError> {
    let raw = raw.trim();

    if let Some(caps) = SECTOR.captures(raw) {
        let upper = sector_upper_bound(&caps[1])
            .ok_or_else(|| RowError::UnrecognizedIndustryCode(raw.to_string()))?;
        return Ok(format!("{}--{:02}", &caps[1], upper));
    }

    if let Some(caps) = SECTOR_RANGE.captures(raw) {
        return Ok(format!("{}--{}", &caps[1], &caps[2]));
    }

    if raw.len() == INDUSTRY_WIDTH && raw.is_ascii() && !raw.contains(char::is_whitespace) {
        return Ok(raw.to_string());
    }

    Err(RowError::UnrecognizedIndustryCode(raw.to_string()))
}

/// Next sector number, if it still fits in two digits
fn sector_upper_bound(sector: &str) -> Option<u8> {
    sector
        .parse::<u8>()
        .ok()
        .map(|value| value + 1)
        .filter(|upper| *upper <= 99)
}

/// Industry code for a row, falling back to the cross-industry total when
/// the extract has no industry column
pub fn industry_code_for(raw: Option<&str>, has_industry_column: bool) -> Result<String, RowError> {
    match raw {
        Some(value) => normalize_industry_code(value),
        None if !has_industry_column => Ok(ALL_INDUSTRY_CODE.to_string()),
        None => Err(RowError::MissingField(
            crate::constants::columns::INDUSTRY.to_string(),
        )),
    }
}
