//! Tests for the crosswalk rule groups, catalog and engine


use crate::models::Row;

/// Create a test row for the national cross-industry total
pub fn create_test_row(occupation_code: &str, value: f64) -> Row {
    Row {
        occupation_code: occupation_code.to_string(),
        industry_code: "000000".to_string(),
        area_code: "N0000000".to_string(),
        metric_type: "01".to_string(),
        metric_value: value,
    }
}

pub fn codes(rows: &[Row]) -> Vec<&str> {
    rows.iter().map(|r| r.occupation_code.as_str()).collect()
}
