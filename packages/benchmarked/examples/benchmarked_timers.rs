//! Instrumenting a multithreaded pipeline with named timers.
//!
//! Worker threads time their own stages on the thread processor clock and the wall clock,
//! while the main thread times the whole run on the process-wide processor clock.
//!
//! Run with: `cargo run --example benchmarked_timers`.

use std::hint::black_box;
use std::thread;
use std::time::Duration;

use benchmarked::{ClockKind, OutputFormat, Timers};

fn parse(input: u64) -> Vec<u64> {
    (0..input).map(|value| value.wrapping_mul(31)).collect()
}

fn transform(values: &mut [u64]) {
    values.sort_unstable_by(|a, b| b.cmp(a));
}

fn main() {
    let timers = Timers::new();

    timers
        .start("pipeline", ClockKind::TotalCpu)
        .expect("nothing else times the pipeline");

    thread::scope(|s| {
        for worker in 1..=3_u64 {
            let timers = &timers;

            s.spawn(move || {
                for _ in 0..5 {
                    let mut values = {
                        let _cpu = timers.scope("parse", ClockKind::ThreadCpu).unwrap();
                        let _wall = timers.scope("parse", ClockKind::Wall).unwrap();
                        parse(worker.wrapping_mul(50_000))
                    };

                    {
                        let _cpu = timers.scope("transform", ClockKind::ThreadCpu).unwrap();
                        transform(&mut values);
                    }

                    // Waiting shows up on the wall clock only.
                    let _wall = timers.scope("io", ClockKind::Wall).unwrap();
                    thread::sleep(Duration::from_millis(2));
                    black_box(values);
                }
            });
        }
    });

    timers
        .stop("pipeline", ClockKind::TotalCpu)
        .expect("the pipeline timer was started above");

    timers.to_report().print_to_stdout();

    println!();
    println!("{}", timers.report(OutputFormat::Csv));
}
