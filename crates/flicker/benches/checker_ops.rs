//! Checker Operations Benchmarks
//!
//! Benchmarks for assertion block sequencing and the consecutive visibility scan.
//!
//! Run with: `cargo bench --bench checker_ops`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flicker::fixtures::{MockEntrySubject, VisibilityTraceSubject};
use flicker::Timestamp;

/// Launcher visible for the first half, app for the second half
fn handover_trace(len: usize) -> Vec<MockEntrySubject> {
    (0..len)
        .map(|i| {
            let id = if i < len / 2 { "Launcher" } else { "App" };
            MockEntrySubject::new(
                Timestamp::from_elapsed_nanos(i as i64 + 1),
                ["StatusBar", "NavBar", id],
            )
        })
        .collect()
}

fn bench_block_sequencing(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_sequencing");

    for len in [100, 1_000, 10_000] {
        let entries = handover_trace(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &entries, |bench, entries| {
            bench.iter(|| {
                let result = VisibilityTraceSubject::new(entries.clone())
                    .is_visible("StatusBar")
                    .is_visible("Launcher")
                    .then()
                    .is_visible("StatusBar")
                    .is_visible("App")
                    .for_all_entries();
                black_box(result)
            });
        });
    }

    group.finish();
}

fn bench_consecutive_visibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("consecutive_visibility");

    for len in [100, 1_000, 10_000] {
        let subject = VisibilityTraceSubject::new(handover_trace(len));
        group.bench_with_input(BenchmarkId::from_parameter(len), &subject, |bench, subject| {
            bench.iter(|| {
                let result = subject.visible_entries_shown_more_than_one_consecutive_time();
                black_box(result)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_block_sequencing,
    bench_consecutive_visibility
);
criterion_main!(benches);
