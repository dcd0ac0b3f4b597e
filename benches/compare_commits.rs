//! Significance classification benchmark
//!
//! Measures the two hot spots of an analysis run:
//!
//! 1. `QuantileTable::from_commits` - one pass over the full history per metric
//! 2. `compare_commits` - routing plus step pipelines for one commit pair
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench compare_commits
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use radar_sig::commit::{metric_union, Commit};
use radar_sig::significance::{compare_commits, QuantileTable, RuleBook, SignificanceConfig};

/// Synthetic lean4-like history: `modules` modules with instructions and lines each
fn create_history(commits: usize, modules: usize) -> Vec<Commit> {
    (0..commits)
        .map(|c| {
            let metrics = (0..modules).flat_map(|m| {
                let base = 1e9 + (m as f64) * 1e6;
                let wobble = ((c * 7 + m * 13) % 17) as f64 * 1e4;
                [
                    (format!("build/module/M{}//instructions", m), base + wobble),
                    (format!("build/module/M{}//lines", m), 1000.0 + (c % 5) as f64),
                ]
            });
            Commit::new(&format!("sha{}", c), "bench", metrics).unwrap()
        })
        .collect()
}

/// Benchmark: quantile computation over histories of growing length
fn bench_quantile_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantile_table");
    let config = SignificanceConfig::default();

    for commits in [50, 200, 800] {
        let history = create_history(commits, 100);
        group.bench_with_input(
            BenchmarkId::from_parameter(commits),
            &history,
            |b, history| {
                b.iter(|| black_box(QuantileTable::from_commits(history, &config)));
            },
        );
    }

    group.finish();
}

/// Benchmark: one commit pair against the builtin lean4 rules
fn bench_compare_pair(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_pair");
    let rules = RuleBook::builtin().unwrap();
    let config = SignificanceConfig::default();

    for modules in [100, 1000, 5000] {
        let history = create_history(30, modules);
        let metrics = metric_union(&history);
        let quantiles = QuantileTable::from_commits(&history, &config);

        group.bench_with_input(BenchmarkId::from_parameter(modules), &modules, |b, _| {
            b.iter(|| {
                black_box(
                    compare_commits(
                        &rules,
                        "lean4",
                        &history[28],
                        &history[29],
                        &metrics,
                        &quantiles,
                    )
                    .unwrap(),
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_quantile_table, bench_compare_pair);
criterion_main!(benches);
