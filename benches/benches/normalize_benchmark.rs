//! Normalization and CSV output throughput.
//!
//! Run with: `cargo bench --package ercot-bench`

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ercot_bench::{SyntheticConfig, grid_records};
use ercot_lib::{CsvFormatter, Formatter, GridLayout, GridNormalizer, ReportLayout, ReportRegistry};
use std::hint::black_box;

fn layout(id: &str) -> GridLayout {
    match ReportRegistry::global().get(id).map(|r| r.layout()) {
        Some(ReportLayout::Grid(grid)) => grid.clone(),
        _ => panic!("{id} is not a registered grid report"),
    }
}

fn config(days: u32, entities: usize) -> SyntheticConfig {
    SyntheticConfig {
        start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        days,
        entities,
        gap_every: 23,
    }
}

fn normalize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    let cases = [("dam-spp", 31, 20), ("rtm-spp-hub", 7, 8), ("rtm-spp-hub", 31, 8)];
    for (report, days, entities) in cases {
        let layout = layout(report);
        let config = config(days, entities);
        let records = grid_records(&layout, &config);
        let normalizer = GridNormalizer::new(layout);

        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_with_input(
            BenchmarkId::new(report, format!("{days}d")),
            &records,
            |b, records| {
                b.iter(|| normalizer.normalize(black_box(records), config.range()).unwrap());
            },
        );
    }

    group.finish();
}

fn csv_benchmark(c: &mut Criterion) {
    let layout = layout("rtm-spp-hub");
    let config = config(31, 8);
    let records = grid_records(&layout, &config);
    let table = GridNormalizer::new(layout)
        .normalize(&records, config.range())
        .unwrap();

    let mut group = c.benchmark_group("csv");
    group.throughput(Throughput::Elements(table.row_count() as u64));
    group.bench_function("write_table", |b| {
        let formatter = CsvFormatter::new();
        b.iter(|| {
            let mut output = Vec::with_capacity(1 << 20);
            formatter.write_table(black_box(&table), &mut output).unwrap();
            output
        });
    });
    group.finish();
}

criterion_group!(benches, normalize_benchmark, csv_benchmark);
criterion_main!(benches);
