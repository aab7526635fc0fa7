use criterion::{Criterion, black_box, criterion_group, criterion_main};
use oews_processor::app::services::record_processor::{
    ProcessingStats, consolidate, recompute_aggregates,
};
use oews_processor::app::services::record_processor::aggregation::encode_rows;
use oews_processor::models::{AggregationFn, Row};

/// One row per detailed occupation across a handful of states
fn synthetic_rows() -> Vec<Row> {
    let mut rows = Vec::new();
    for state in 1..=10 {
        for major in (11..=53).step_by(2) {
            for detail in 1..=40 {
                rows.push(Row {
                    occupation_code: format!("{:02}{:04}", major, detail * 10 + 1),
                    industry_code: "000000".to_string(),
                    area_code: format!("S{:02}00000", state),
                    metric_type: "01".to_string(),
                    metric_value: (state * detail) as f64,
                });
            }
        }
    }
    rows
}

fn bench_recompute_aggregates(c: &mut Criterion) {
    let rows = synthetic_rows();

    c.bench_function("recompute_aggregates_sum", |b| {
        b.iter(|| {
            let mut stats = ProcessingStats::new();
            let encoded = encode_rows(rows.clone()).unwrap();
            let table = consolidate(encoded, AggregationFn::Sum, &mut stats);
            black_box(recompute_aggregates(table, AggregationFn::Sum, &mut stats).unwrap())
        })
    });

    c.bench_function("recompute_aggregates_mean", |b| {
        b.iter(|| {
            let mut stats = ProcessingStats::new();
            let encoded = encode_rows(rows.clone()).unwrap();
            let table = consolidate(encoded, AggregationFn::Mean, &mut stats);
            black_box(recompute_aggregates(table, AggregationFn::Mean, &mut stats).unwrap())
        })
    });
}

criterion_group!(benches, bench_recompute_aggregates);
criterion_main!(benches);
