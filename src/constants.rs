//! Application constants for the OEWS processor
//!
//! This module contains the fixed-width identifier layout, canonical codes,
//! column names and default values used throughout the processor.

// =============================================================================
// Series Identifier Layout
// =============================================================================

/// Series identifier field widths and offsets
///
/// Offsets are derived from the widths so that encode and decode can never
/// drift apart when a width changes.
pub mod series_layout {
    pub const PREFIX_WIDTH: usize = 3;
    pub const AREA_WIDTH: usize = 8;
    pub const INDUSTRY_WIDTH: usize = 6;
    pub const OCCUPATION_WIDTH: usize = 6;
    pub const METRIC_TYPE_WIDTH: usize = 2;

    pub const PREFIX_OFFSET: usize = 0;
    pub const AREA_OFFSET: usize = PREFIX_OFFSET + PREFIX_WIDTH;
    pub const INDUSTRY_OFFSET: usize = AREA_OFFSET + AREA_WIDTH;
    pub const OCCUPATION_OFFSET: usize = INDUSTRY_OFFSET + INDUSTRY_WIDTH;
    pub const METRIC_TYPE_OFFSET: usize = OCCUPATION_OFFSET + OCCUPATION_WIDTH;

    /// Total identifier width (25 with the current layout)
    pub const SERIES_ID_WIDTH: usize = METRIC_TYPE_OFFSET + METRIC_TYPE_WIDTH;
}

/// Prefix of every occupational employment series identifier
pub const SERIES_PREFIX: &str = "OEU";

// =============================================================================
// Canonical Codes
// =============================================================================

/// Area code for the nation as a whole
pub const NATIONAL_AREA_CODE: &str = "N0000000";

/// Industry code for the cross-industry total
pub const ALL_INDUSTRY_CODE: &str = "000000";

/// Area code prefixes by geography kind
pub mod area_prefix {
    pub const STATE: char = 'S';
    pub const METRO: &str = "M";
    /// Metro areas from the 5-digit numbering space are left-padded into 7
    pub const METRO_NARROW: &str = "M00";
}

/// Suffix appended to a state number to form a statewide area code
pub const STATEWIDE_SUFFIX: &str = "00000";

/// Zero-padded widths of the raw area numbers
pub const STATE_NUMBER_WIDTH: usize = 2;
pub const METRO_NARROW_WIDTH: usize = 5;
pub const METRO_WIDE_WIDTH: usize = 7;

// =============================================================================
// Aggregation
// =============================================================================

/// Deepest trailing-zero level recomputed from leaves
pub const MAX_AGGREGATION_DEPTH: usize = 4;

/// Digit marking an aggregate position in an occupation code
pub const GROUP_DIGIT: char = '0';

// =============================================================================
// Output Records
// =============================================================================

/// Period label of an annual observation
pub const ANNUAL_PERIOD: &str = "A01";

/// Record output filename
pub const VALUES_OUTPUT_FILENAME: &str = "values.parquet";

/// Series descriptor output filename
pub const SERIES_OUTPUT_FILENAME: &str = "series.parquet";

// =============================================================================
// Source Columns
// =============================================================================

/// Normalized source column names
pub mod columns {
    pub const AREA_TYPE: &str = "AREA_TYPE";
    pub const AREA: &str = "AREA";
    pub const AREA_TITLE: &str = "AREA_TITLE";
    pub const INDUSTRY: &str = "NAICS";
    pub const OCCUPATION: &str = "OCC_CODE";
}

/// Metric values that mark suppressed or unavailable estimates
pub const SUPPRESSION_MARKERS: &[&str] = &["*", "**", "#", "-", "~"];

// =============================================================================
// Processing Defaults
// =============================================================================

/// Metric types processed when none are configured
pub const DEFAULT_METRIC_TYPES: &[&str] = &["01", "13"];

/// Source folder names recognized for each partition
pub mod partition_folders {
    pub const NATIONAL: &[&str] = &["nat", "national"];
    pub const STATE: &[&str] = &["state"];
    pub const METRO: &[&str] = &["metro"];
    pub const COMBINED: &[&str] = &["full", "combined", "all"];
}

/// Extension of the source extracts
pub const SOURCE_EXTENSION: &str = "csv";

/// Default config file location under the user config dir
pub const CONFIG_DIR_NAME: &str = "oews-processor";
pub const CONFIG_FILE_NAME: &str = "config.toml";
