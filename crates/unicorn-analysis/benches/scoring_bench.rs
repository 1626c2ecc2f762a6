//! Scoring and Top-N selection benchmarks.

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use unicorn_analysis::selection::{select_top, SelectionLimits};
use unicorn_analysis::{PatternCatalog, Scorer};
use unicorn_core::types::{MarketWeights, MetricRow};

fn rows(n: usize) -> Vec<MetricRow> {
    (0..n)
        .map(|i| {
            let value = ((i * 7919) % 1000) as f64 / 10.0;
            MetricRow::new(i as i64, value, 10 + (i % 90) as u32)
        })
        .collect()
}

fn scoring_benchmark(c: &mut Criterion) {
    let catalog = PatternCatalog::seed().unwrap();
    let snapshot = catalog.snapshot();
    let pattern = snapshot.get("UNQ-H-0002").unwrap();
    let run_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let market: MarketWeights = (0..500).map(|i| (i, 1.0 + (i % 3) as f64 * 0.01)).collect();
    let scorer = Scorer::new(0.01);

    let mut group = c.benchmark_group("score_pattern");
    for n in [50usize, 500] {
        let input = rows(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| scorer.score(pattern, run_date, std::hint::black_box(input), &market));
        });
    }
    group.finish();
}

fn selection_benchmark(c: &mut Criterion) {
    let catalog = PatternCatalog::seed().unwrap();
    let snapshot = catalog.snapshot();
    let run_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let scorer = Scorer::default();
    let market = MarketWeights::new();
    let all: Vec<_> = snapshot
        .patterns()
        .iter()
        .flat_map(|p| scorer.score(p, run_date, &rows(500), &market))
        .collect();

    c.bench_function("select_top_50", |b| {
        b.iter(|| select_top(run_date, std::hint::black_box(&all), SelectionLimits::default()));
    });
}

criterion_group!(benches, scoring_benchmark, selection_benchmark);
criterion_main!(benches);
