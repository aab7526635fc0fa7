//! Area code normalization
//!
//! Area codes are eight characters with a geography prefix: `N` for the
//! nation, `S` + state number for states and `M` + metro number for
//! metropolitan areas.

use crate::constants::{
    METRO_NARROW_WIDTH, METRO_WIDE_WIDTH, NATIONAL_AREA_CODE, STATE_NUMBER_WIDTH,
    STATEWIDE_SUFFIX, area_prefix, columns,
};
use crate::error::RowError;
use crate::models::{Partition, RawRow};

/// Geography described by the `AREA_TYPE` column of combined extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaType {
    National,
    State,
    /// Metro areas numbered in the 5-digit space
    Metro,
    /// Metro areas numbered in the wider 7-digit space used in some years
    WideMetro,
}

impl AreaType {
    pub fn parse(raw: &str) -> Result<Self, RowError> {
        match raw.trim().parse::<u8>() {
            Ok(1) => Ok(AreaType::National),
            Ok(2) | Ok(3) => Ok(AreaType::State),
            Ok(4) | Ok(5) => Ok(AreaType::Metro),
            Ok(6) => Ok(AreaType::WideMetro),
            _ => Err(RowError::UnrecognizedAreaType(raw.trim().to_string())),
        }
    }
}

/// Left-pad an area number with zeros, rejecting non-digits and overflow
fn zero_pad(number: &str, width: usize) -> Result<String, RowError> {
    let number = number.trim();
    if number.is_empty() || number.len() > width || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(RowError::MalformedArea(number.to_string()));
    }
    Ok(format!("{:0>width$}", number, width = width))
}

pub fn state_area_code(state_number: &str) -> Result<String, RowError> {
    Ok(format!(
        "{}{}{}",
        area_prefix::STATE,
        zero_pad(state_number, STATE_NUMBER_WIDTH)?,
        STATEWIDE_SUFFIX
    ))
}

pub fn metro_area_code(metro_number: &str) -> Result<String, RowError> {
    Ok(format!(
        "{}{}",
        area_prefix::METRO_NARROW,
        zero_pad(metro_number, METRO_NARROW_WIDTH)?
    ))
}

pub fn wide_metro_area_code(metro_number: &str) -> Result<String, RowError> {
    Ok(format!(
        "{}{}",
        area_prefix::METRO,
        zero_pad(metro_number, METRO_WIDE_WIDTH)?
    ))
}

/// Area code for a row given the partition it came from
pub fn area_code_for(row: &RawRow, partition: Partition) -> Result<String, RowError> {
    match partition {
        Partition::National => Ok(NATIONAL_AREA_CODE.to_string()),
        Partition::State => state_area_code(row.require(columns::AREA)?),
        Partition::Metro | Partition::Combined => {
            let area_type = AreaType::parse(row.require(columns::AREA_TYPE)?)?;
            match area_type {
                AreaType::National => Ok(NATIONAL_AREA_CODE.to_string()),
                AreaType::State => state_area_code(row.require(columns::AREA)?),
                AreaType::Metro => metro_area_code(row.require(columns::AREA)?),
                AreaType::WideMetro => wide_metro_area_code(row.require(columns::AREA)?),
            }
        }
    }
}
