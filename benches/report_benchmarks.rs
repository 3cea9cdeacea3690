//! Report aggregation benchmarks
//!
//! Benchmarks for the post-run pipeline over synthetic results:
//! - Table merge (dataset-level broadcast)
//! - Summary aggregation
//! - Columnar conversion for the workbook

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lipd_qc::report::frame::results_batch;
use lipd_qc::report::{merge, Identity, Outcome, ResultCollector, ResultTable, Summary};

const CHECKS: [&str; 4] = ["latlon", "ages", "duplicated_ages", "elevation"];

/// Collected results of `datasets` datasets with 4 series each
#[allow(clippy::cast_precision_loss)]
fn create_results(datasets: usize) -> ResultTable {
    let mut collector = ResultCollector::new();
    for d in 0..datasets {
        let name = format!("Lake{d:05}");
        let general = Identity::dataset(name.as_str());
        collector.record(&general, "chronology present", d % 7 != 0);
        collector.record(&general, "nchronpoints", d % 13);
        collector.record_outcome(&general, "chronology_points", Outcome::Passed, "chronology_points[x]");

        for t in 0..4 {
            let series = Identity::series(name.as_str(), format!("TS{t}"));
            collector.record(&series, "min_age", (d * t) as f64);
            for (i, check) in CHECKS.iter().enumerate() {
                let outcome = if (d + t + i) % 11 == 0 { Outcome::Failed } else { Outcome::Passed };
                collector.record_outcome(&series, check, outcome, "id");
            }
        }
    }
    collector.finish().table
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for datasets in [100, 1_000] {
        let table = create_results(datasets);
        group.bench_with_input(BenchmarkId::from_parameter(datasets), &table, |b, table| {
            b.iter(|| merge(black_box(table.clone())));
        });
    }
    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary");
    for datasets in [100, 1_000] {
        let merged = merge(create_results(datasets));
        group.bench_with_input(BenchmarkId::from_parameter(datasets), &merged, |b, merged| {
            b.iter(|| Summary::from_table(black_box(merged)));
        });
    }
    group.finish();
}

fn bench_results_batch(c: &mut Criterion) {
    let merged = merge(create_results(1_000));
    c.bench_function("results_batch/1000", |b| {
        b.iter(|| results_batch(black_box(&merged)).unwrap());
    });
}

criterion_group!(benches, bench_merge, bench_summary, bench_results_batch);
criterion_main!(benches);
