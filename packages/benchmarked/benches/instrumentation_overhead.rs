//! Measures the overhead of the instrumentation timers themselves.
//!
//! Every benchmark times an empty region, so the measured time is only the cost of starting
//! and stopping a timer. Each sample uses a fresh registry because every region stays in
//! memory until the registry is dropped.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::time::Instant;

use benchmarked::{ClockKind, Timers};
use criterion::{Criterion, criterion_group, criterion_main};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("benchmarked_overhead");

    group.bench_function("baseline_empty", |b| {
        b.iter(|| {
            black_box(());
        });
    });

    for kind in ClockKind::ALL {
        group.bench_function(format!("start_stop_{kind}"), |b| {
            b.iter_custom(|iters| {
                let timers = Timers::new();

                let start = Instant::now();
                for _ in 0..iters {
                    timers.start(black_box("empty"), kind).unwrap();
                    timers.stop(black_box("empty"), kind).unwrap();
                }
                start.elapsed()
            });
        });

        group.bench_function(format!("scope_{kind}"), |b| {
            b.iter_custom(|iters| {
                let timers = Timers::new();

                let start = Instant::now();
                for _ in 0..iters {
                    let _scope = timers.scope(black_box("empty"), kind).unwrap();
                }
                start.elapsed()
            });
        });
    }

    let timers = Timers::new();
    for _ in 0..1000 {
        for kind in ClockKind::ALL {
            timers.start("region", kind).unwrap();
            timers.stop("region", kind).unwrap();
        }
    }

    group.bench_function("to_report_1000_regions", |b| {
        b.iter(|| {
            black_box(timers.to_report());
        });
    });

    group.finish();
}
