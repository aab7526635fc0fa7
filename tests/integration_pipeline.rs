//! End-to-end tests: CSV extracts on disk through the pipeline into a sink

use chrono::NaiveDate;
use oews_processor::app::services::series_id::encode;
use oews_processor::{
    MemorySink, OewsConfig, ParquetSink, Partition, PipelineProcessor, RecordSink, SourceDataset,
    RawRow,
};
use polars::prelude::{ParquetReader, SerReader};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_extract(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn series(area: &str, industry: &str, occupation: &str, metric: &str) -> String {
    encode("OEU", area, industry, occupation, metric)
        .unwrap()
        .into_string()
}

fn national(occupation: &str, metric: &str) -> String {
    series("N0000000", "000000", occupation, metric)
}

fn jan_first(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
}

fn quiet_config() -> OewsConfig {
    OewsConfig::default().with_workers(2).without_progress()
}

/// National and state extracts for 2019 plus an old national extract
fn create_survey_tree(root: &Path) {
    write_extract(
        root,
        "nat/2019.csv",
        "OCC_CODE,OCC_TITLE,TOT_EMP,A_MEDIAN\n\
         15-1120,Computer analysts,999,1\n\
         15-1121,Computer systems analysts,100,80000\n\
         15-1122,Information security analysts,50,90000\n\
         15-1131,Computer programmers,*,70000\n",
    );
    write_extract(
        root,
        "state/2019.csv",
        "AREA,OCC_CODE,TOT_EMP,A_MEDIAN\n\
         6,15-1121,\"1,200\",95000\n\
         XX,15-1121,10,1\n",
    );
    write_extract(
        root,
        "nat/1999.csv",
        "OCC_CODE,TOT_EMP,A_MEDIAN\n\
         15-1051,40,50000\n",
    );
}

#[tokio::test]
async fn test_pipeline_builds_series_from_extracts() {
    let temp_dir = TempDir::new().unwrap();
    create_survey_tree(temp_dir.path());

    let processor = PipelineProcessor::new(temp_dir.path().to_path_buf(), quiet_config()).unwrap();
    let mut sink = MemorySink::new();
    let summary = processor.process(&mut sink).await.unwrap();

    assert_eq!(summary.datasets_processed, 3);
    assert_eq!(summary.datasets_skipped, 0);
    assert_eq!(summary.records_written, sink.len());

    let value = |id: String, year: i32| sink.get(&id, jan_first(year)).unwrap().value;

    // Group values are recomputed from detailed occupations
    assert_eq!(value(national("151120", "01"), 2019), 150.0);
    assert_eq!(value(national("151100", "01"), 2019), 150.0);
    assert_eq!(value(national("151120", "13"), 2019), 85000.0);

    // Suppressed employment is dropped but the wage survives
    assert!(sink.get(&national("151131", "01"), jan_first(2019)).is_none());
    assert_eq!(value(national("151131", "13"), 2019), 70000.0);
    assert_eq!(summary.stats.dropped_for("metric_value"), 1);

    // State rows with a malformed area are dropped once, before metrics
    assert_eq!(value(series("S0600000", "000000", "151121", "01"), 2019), 1200.0);
    assert_eq!(summary.stats.dropped_for("area"), 1);

    // 1999 codes are carried through both revisions
    assert_eq!(value(national("151211", "01"), 1999), 40.0);
    assert!(sink.get(&national("151051", "01"), jan_first(1999)).is_none());

    assert!(
        sink.series()
            .any(|descriptor| descriptor.code == national("151120", "13"))
    );
    assert!(sink.records().all(|record| record.period == "A01"));
}

#[tokio::test]
async fn test_year_floors_skip_datasets() {
    let temp_dir = TempDir::new().unwrap();
    create_survey_tree(temp_dir.path());

    let config = quiet_config()
        .with_min_year(2000)
        .with_year_floor(Partition::State, 2020);
    let processor = PipelineProcessor::new(temp_dir.path().to_path_buf(), config).unwrap();
    let mut sink = MemorySink::new();
    let summary = processor.process(&mut sink).await.unwrap();

    assert_eq!(summary.datasets_processed, 1);
    assert_eq!(summary.datasets_skipped, 2);
    assert!(sink.records().all(|record| record.year == 2019));
    assert!(sink.records().all(|record| record.series_id.contains("N0000000")));
}

#[tokio::test]
async fn test_combined_extract_overwrites_national_rows() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_extract(root, "nat/2019.csv", "OCC_CODE,TOT_EMP,A_MEDIAN\n15-1121,100,80000\n");
    write_extract(
        root,
        "full/2019.csv",
        "AREA_TYPE,AREA,NAICS,OCC_CODE,TOT_EMP,A_MEDIAN\n\
         1,99,000000,15-1121,120,81000\n\
         4,31080,000000,15-1121,30,99000\n",
    );

    let config = quiet_config().with_metric_types(vec!["01".to_string()]);
    let processor = PipelineProcessor::new(root.to_path_buf(), config).unwrap();
    let mut sink = MemorySink::new();
    processor.process(&mut sink).await.unwrap();

    let date = jan_first(2019);
    assert_eq!(sink.get(&national("151121", "01"), date).unwrap().value, 120.0);
    assert_eq!(
        sink.get(&series("M0031080", "000000", "151121", "01"), date)
            .unwrap()
            .value,
        30.0
    );
    // The leaf and its four group levels
    assert_eq!(sink.overwrites(), 5);
}

#[tokio::test]
async fn test_pipeline_writes_parquet_tables() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("input");
    create_survey_tree(&input);

    let processor = PipelineProcessor::new(input, quiet_config()).unwrap();
    let mut sink = ParquetSink::new(temp_dir.path().join("output"), Default::default()).unwrap();
    let summary = processor.process(&mut sink).await.unwrap();

    let values = ParquetReader::new(fs::File::open(sink.values_path()).unwrap())
        .finish()
        .unwrap();
    assert_eq!(values.height(), summary.records_written);
    assert_eq!(values.width(), 5);
    for name in ["series_code", "year", "period", "data_date", "value"] {
        assert!(values.column(name).is_ok(), "missing column {}", name);
    }

    let series_table = ParquetReader::new(fs::File::open(sink.series_path()).unwrap())
        .finish()
        .unwrap();
    assert!(series_table.height() > 0);
    assert!(series_table.height() <= summary.records_written);
}

#[tokio::test]
async fn test_process_in_memory_datasets() {
    let rows = vec![
        RawRow::from_pairs([("OCC_CODE", "15-1121"), ("TOT_EMP", "10"), ("A_MEDIAN", "1")]),
        RawRow::from_pairs([("OCC_CODE", "15-1121"), ("TOT_EMP", "99"), ("A_MEDIAN", "2")]),
    ];
    let datasets = vec![SourceDataset::new(2020, Partition::National, rows)];

    let processor = PipelineProcessor::new(".".into(), quiet_config()).unwrap();
    let mut sink = MemorySink::new();
    let summary = processor.process_datasets(datasets, &mut sink).await.unwrap();

    assert_eq!(summary.stats.duplicates_removed, 2);
    assert_eq!(
        sink.get(&national("151121", "01"), jan_first(2020))
            .unwrap()
            .value,
        10.0
    );
    assert_eq!(sink.finish().unwrap(), sink.len());
}

#[tokio::test]
async fn test_missing_input_directory_fails() {
    let processor =
        PipelineProcessor::new("/nonexistent/oews".into(), quiet_config()).unwrap();
    let mut sink = MemorySink::new();
    assert!(processor.process(&mut sink).await.is_err());
}
