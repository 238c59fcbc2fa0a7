#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Fixed-iteration benchmark harness with named, thread-aware instrumentation timers.
//!
//! This package measures code in two complementary ways:
//!
//! - [`Benchmark`] runs a routine a fixed number of times, wrapped in [`Fixture`] hooks, and
//!   records the processor time and wall-clock time of every iteration as an
//!   [`IterationResult`].
//!   A [`Launcher`] holds benchmark factories, selects benchmarks with a [`Filter`], runs them
//!   and feeds the completed ones to a [`Reporter`].
//! - [`Timers`] is a registry of named start/stop timing regions that can be scattered through
//!   arbitrary code on any thread. Every region belongs to a [`ClockKind`] and is recorded per
//!   originating thread, then aggregated into a [`TimerReport`].
//!
//! This package is not meant for use in production, serving only as a development tool.
//!
//! # Benchmarks
//!
//! ```
//! use benchmarked::{Benchmark, ConsoleReporter, Filter, Launcher, SystemProfile};
//!
//! # fn main() -> Result<(), benchmarked::Error> {
//! let mut launcher = Launcher::new("demo");
//!
//! launcher.register_builder(|| {
//!     Benchmark::builder("fibonacci_100")
//!         .kind("example")
//!         .description("compute the first 100 fibonacci numbers")
//!         .iterations(5)
//!         .run(|_| {
//!             let (mut a, mut b) = (0_u64, 1_u64);
//!             for _ in 0..100 {
//!                 (a, b) = (b, a.wrapping_add(b));
//!             }
//!             std::hint::black_box(a);
//!         })
//! });
//!
//! launcher.launch(&Filter::all());
//!
//! let mut reporter = ConsoleReporter::new(std::io::stdout(), SystemProfile::detect());
//! launcher.report(&mut reporter)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Instrumentation timers
//!
//! ```
//! use benchmarked::{ClockKind, OutputFormat, Timers};
//!
//! # fn main() -> Result<(), benchmarked::Error> {
//! let timers = Timers::new();
//!
//! timers.start("parse", ClockKind::Wall)?;
//! std::hint::black_box((0..1000).sum::<u64>());
//! timers.stop("parse", ClockKind::Wall)?;
//!
//! {
//!     let _scope = timers.scope("parse", ClockKind::ThreadCpu)?;
//!     std::hint::black_box((0..1000).sum::<u64>());
//! } // The region is closed here.
//!
//! println!("{}", timers.report(OutputFormat::Console));
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//!
//! [`Timers`] is `Send + Sync` and intended to be shared between worker threads, typically via
//! `Arc` or scoped threads. Regions are keyed by the calling thread, so two threads can time the
//! same name concurrently without interfering. The only exception is [`ClockKind::TotalCpu`],
//! which measures the whole process and therefore has a single logical timeline shared by all
//! threads.
//!
//! Benchmarks run on the thread that calls [`Launcher::launch()`]. There is no preemption: a
//! routine that never returns stalls the launcher.

mod benchmark;
mod clock;
mod config;
mod error;
mod filter;
mod fixture;
mod launcher;
mod ledger;
mod pal;
mod reporter;
pub mod stats;
mod system;
mod timer_report;
mod timers;

pub use benchmark::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use filter::*;
pub use fixture::*;
pub use launcher::*;
pub use reporter::*;
pub use stats::Summary;
pub use system::*;
pub use timer_report::*;
pub use timers::*;

pub(crate) const ERR_POISONED_LOCK: &str =
    "encountered poisoned lock - recorded timing data can no longer be trusted";
