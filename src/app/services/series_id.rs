//! Fixed-width composite series identifier codec.
//!
//! A series identifier concatenates `PREFIX + AREA + INDUSTRY + OCCUPATION +
//! METRIC_TYPE`. Every field has a declared width in
//! [`series_layout`](crate::constants::series_layout) and decoding slices at
//! offsets derived from those same widths.

use crate::constants::series_layout::*;
use crate::error::{OewsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An encoded series identifier, always [`SERIES_ID_WIDTH`] ASCII characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesId(String);

impl SeriesId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Decode this identifier back into its components
    pub fn decode(&self) -> Result<DecodedSeries> {
        decode(&self.0)
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SeriesId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Components recovered from a series identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedSeries {
    pub prefix: String,
    pub occupation: String,
    pub industry: String,
    pub area: String,
    pub metric_type: String,
}

/// A distinct series registered in the store's series table
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesDescriptor {
    pub code: String,
    pub occupation_code: String,
    pub industry_code: String,
    pub area_code: String,
    pub metric_type: String,
}

impl SeriesDescriptor {
    pub fn from_id(id: &SeriesId) -> Result<Self> {
        let decoded = id.decode()?;
        Ok(Self {
            code: id.as_str().to_string(),
            occupation_code: decoded.occupation,
            industry_code: decoded.industry,
            area_code: decoded.area,
            metric_type: decoded.metric_type,
        })
    }
}

fn check_width(field: &'static str, value: &str, expected: usize) -> Result<()> {
    if value.len() != expected || !value.is_ascii() {
        return Err(OewsError::IdentifierWidth {
            field,
            expected,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Build a series identifier from its components
///
/// Fails rather than truncating or padding when a component has the wrong width.
pub fn encode(
    prefix: &str,
    area: &str,
    industry: &str,
    occupation: &str,
    metric_type: &str,
) -> Result<SeriesId> {
    check_width("prefix", prefix, PREFIX_WIDTH)?;
    check_width("area", area, AREA_WIDTH)?;
    check_width("industry", industry, INDUSTRY_WIDTH)?;
    check_width("occupation", occupation, OCCUPATION_WIDTH)?;
    check_width("metric_type", metric_type, METRIC_TYPE_WIDTH)?;

    let mut id = String::with_capacity(SERIES_ID_WIDTH);
    id.push_str(prefix);
    id.push_str(area);
    id.push_str(industry);
    id.push_str(occupation);
    id.push_str(metric_type);
    Ok(SeriesId(id))
}

/// Split a series identifier into its components
pub fn decode(identifier: &str) -> Result<DecodedSeries> {
    if identifier.len() != SERIES_ID_WIDTH || !identifier.is_ascii() {
        return Err(OewsError::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: format!(
                "expected {} ASCII characters, found {}",
                SERIES_ID_WIDTH,
                identifier.chars().count()
            ),
        });
    }

    let field = |offset: usize, width: usize| identifier[offset..offset + width].to_string();

    Ok(DecodedSeries {
        prefix: field(PREFIX_OFFSET, PREFIX_WIDTH),
        occupation: field(OCCUPATION_OFFSET, OCCUPATION_WIDTH),
        industry: field(INDUSTRY_OFFSET, INDUSTRY_WIDTH),
        area: field(AREA_OFFSET, AREA_WIDTH),
        metric_type: field(METRIC_TYPE_OFFSET, METRIC_TYPE_WIDTH),
    })
}

/// Re-key an identifier under a different occupation code
pub fn with_occupation(id: &SeriesId, occupation: &str) -> Result<SeriesId> {
    let decoded = id.decode()?;
    encode(
        &decoded.prefix,
        &decoded.area,
        &decoded.industry,
        occupation,
        &decoded.metric_type,
    )
}
