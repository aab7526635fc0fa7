//! Tests for the per-dataset pipeline

use super::*;
use crate::app::services::crosswalk::TransformationGroup;
use crate::app::services::record_processor::parse_metric_value;
use crate::error::RowError;
use crate::models::Partition;
use std::collections::BTreeMap;
use std::collections::HashSet;

fn values_by_id(result: &crate::app::services::record_processor::ProcessingResult) -> BTreeMap<String, f64> {
    result
        .records
        .iter()
        .map(|r| (r.series_id.clone(), r.value))
        .collect()
}

fn national_id(occupation: &str, metric: &str) -> String {
    format!("OEUN0000000000000{occupation}{metric}")
}

#[test]
fn test_parse_metric_value() {
    assert_eq!(parse_metric_value("1,234").unwrap(), 1234.0);
    assert_eq!(parse_metric_value(" 12.5 ").unwrap(), 12.5);
    assert_eq!(parse_metric_value("1,234,567.25").unwrap(), 1_234_567.25);
    for raw in ["*", "**", "#", "-", "~", "abc", "NaN", "inf"] {
        assert!(
            matches!(parse_metric_value(raw), Err(RowError::MalformedMetric(_))),
            "{raw} should be rejected"
        );
    }
}

#[test]
fn test_process_dataset_end_to_end() {
    let processor = create_test_processor(Vec::new());
    let dataset = create_national_dataset(
        2019,
        vec![
            create_raw_row("00-0000", "1,000", "40000"),
            create_raw_row("15-1211", "100", "50000"),
            create_raw_row("15-1212", "50", "70000"),
        ],
    );

    let result = processor.process_dataset(&dataset).unwrap();
    let values = values_by_id(&result);

    assert_eq!(result.record_count(), 14);
    assert_eq!(result.series.len(), 14);
    assert_eq!(values[&national_id("000000", "01")], 1000.0);
    assert_eq!(values[&national_id("151210", "01")], 150.0);
    assert_eq!(values[&national_id("150000", "01")], 150.0);
    assert_eq!(values[&national_id("151210", "13")], 60000.0);
    assert_eq!(values[&national_id("000000", "13")], 40000.0);

    assert!(result.records.iter().all(|r| r.year == 2019 && r.period == "A01"));
    assert_eq!(result.stats.total_input, 3);
    assert_eq!(result.stats.classified, 3);
    assert_eq!(result.stats.final_output, 14);
}

#[test]
fn test_suppressed_values_dropped_per_metric() {
    let processor = create_test_processor(Vec::new());
    let dataset = create_national_dataset(
        2019,
        vec![
            create_raw_row("15-1211", "100", "*"),
            create_raw_row("15-1212", "50", "70000"),
        ],
    );

    let result = processor.process_dataset(&dataset).unwrap();
    let values = values_by_id(&result);

    assert_eq!(values[&national_id("151210", "01")], 150.0);
    assert_eq!(values[&national_id("151210", "13")], 70000.0);
    assert!(!values.contains_key(&national_id("151211", "13")));
    assert_eq!(result.stats.dropped_for("metric_value"), 1);
}

#[test]
fn test_unparsable_duplicate_does_not_shadow_valid_row() {
    let processor = create_test_processor(Vec::new());
    let dataset = create_national_dataset(
        2019,
        vec![
            create_raw_row("15-1211", "**", "50000"),
            create_raw_row("15-1211", "100", "60000"),
        ],
    );

    let result = processor.process_dataset(&dataset).unwrap();
    let values = values_by_id(&result);

    assert_eq!(values[&national_id("151211", "01")], 100.0);
    // First parsable row wins for the median
    assert_eq!(values[&national_id("151211", "13")], 50000.0);
}

#[test]
fn test_unclassifiable_rows_counted() {
    let processor = create_test_processor(Vec::new());
    let dataset = create_national_dataset(
        2019,
        vec![
            create_raw_row("15-121", "100", "50000"),
            RawRow::from_pairs([("TOT_EMP", "5")]),
            create_raw_row("15-1211", "100", "50000"),
        ],
    );

    let result = processor.process_dataset(&dataset).unwrap();

    assert_eq!(result.stats.classified, 1);
    assert_eq!(result.stats.dropped_for("occupation_code"), 1);
    assert_eq!(result.stats.dropped_for("missing_field"), 1);
    assert!(result.stats.classification_rate() < 50.0);
}

#[test]
fn test_sector_without_upper_bound_drops_only_that_row() {
    let processor = create_test_processor(Vec::new());
    let dataset = create_national_dataset(
        2019,
        vec![
            RawRow::from_pairs([("NAICS", "31"), ("OCC_CODE", "15-1121"), ("TOT_EMP", "10")]),
            RawRow::from_pairs([("NAICS", "99"), ("OCC_CODE", "15-1121"), ("TOT_EMP", "10")]),
        ],
    );

    let result = processor.process_dataset(&dataset).unwrap();

    assert_eq!(result.stats.classified, 1);
    assert_eq!(result.stats.dropped_for("industry_code"), 1);
    assert!(
        result
            .records
            .iter()
            .any(|r| r.series_id == "OEUN000000031--3215112101")
    );
    assert!(result.series.iter().all(|s| s.industry_code == "31--32"));
}

#[test]
fn test_composed_remap_in_early_year() {
    let processor = create_test_processor(vec![
        TransformationGroup::revision("first", 2010, [("111111", "222222")]).unwrap(),
        TransformationGroup::revision("second", 2018, [("222222", "333333")]).unwrap(),
    ]);
    let dataset = create_national_dataset(1999, vec![create_raw_row("11-1111", "10", "100")]);

    let result = processor.process_dataset(&dataset).unwrap();
    let values = values_by_id(&result);

    assert_eq!(values[&national_id("333333", "01")], 10.0);
    assert!(!values.contains_key(&national_id("111111", "01")));
    assert_eq!(result.stats.remapped, 4);
}

#[test]
fn test_crosswalk_merges_are_consolidated() {
    let processor = create_test_processor(vec![
        TransformationGroup::revision(
            "soc-2010",
            2010,
            [("13-1078", "13-1071"), ("13-1079", "13-1071")],
        )
        .unwrap(),
    ]);
    let dataset = create_national_dataset(
        2005,
        vec![
            create_raw_row("13-1078", "30", "40000"),
            create_raw_row("13-1079", "20", "60000"),
        ],
    );

    let result = processor.process_dataset(&dataset).unwrap();
    let values = values_by_id(&result);

    assert_eq!(values[&national_id("131071", "01")], 50.0);
    assert_eq!(values[&national_id("131071", "13")], 50000.0);
    assert_eq!(values[&national_id("131070", "01")], 50.0);

    let ids: HashSet<_> = result.records.iter().map(|r| &r.series_id).collect();
    assert_eq!(ids.len(), result.records.len());
}

#[test]
fn test_degrouping_runs_before_deduplication() {
    let processor = create_test_processor(vec![
        TransformationGroup::degrouping("fix-2012", 2012, [("15-1799", "15-1199")]).unwrap(),
    ]);
    let dataset = create_national_dataset(
        2012,
        vec![
            create_raw_row("15-1799", "5", "100"),
            create_raw_row("15-1199", "7", "200"),
        ],
    );

    let result = processor.process_dataset(&dataset).unwrap();
    let values = values_by_id(&result);

    assert_eq!(values[&national_id("151199", "01")], 5.0);
    assert_eq!(result.stats.degrouped, 2);
    assert_eq!(result.stats.duplicates_removed, 2);
    assert_eq!(result.stats.merged, 0);
}

#[test]
fn test_column_override_for_early_years() {
    let metrics = crate::metric_catalog::MetricCatalog::default()
        .select(&["11".to_string()])
        .unwrap();
    let processor = RecordProcessor::new(
        std::sync::Arc::new(crate::app::services::crosswalk::CrosswalkEngine::identity()),
        metrics,
    );
    let rows = vec![RawRow::from_pairs([
        ("OCC_CODE", "29-1111"),
        ("a_wpct10", "30000"),
        ("A_PCT10", "1"),
    ])];

    let early = processor
        .process_dataset(&SourceDataset::new(1999, Partition::National, rows.clone()))
        .unwrap();
    assert_eq!(values_by_id(&early)[&national_id("291111", "11")], 30000.0);

    let later = processor
        .process_dataset(&SourceDataset::new(2005, Partition::National, rows))
        .unwrap();
    assert_eq!(values_by_id(&later)[&national_id("291111", "11")], 1.0);
}

#[test]
fn test_state_partition_records() {
    let processor = create_test_processor(Vec::new());
    let dataset = SourceDataset::new(
        2019,
        Partition::State,
        vec![RawRow::from_pairs([
            ("AREA", "6"),
            ("OCC_CODE", "15-1211"),
            ("TOT_EMP", "10"),
            ("A_MEDIAN", "90000"),
        ])],
    );

    let result = processor.process_dataset(&dataset).unwrap();
    assert!(
        result
            .records
            .iter()
            .any(|r| r.series_id == "OEUS060000000000015121101")
    );
    assert!(result.series.iter().all(|s| s.area_code == "S0600000"));
}
