use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use crate::{Benchmark, Error, Filter, Reporter, Result};

/// Holds a collection of benchmarks, launches the selected ones and reports the results.
///
/// Benchmarks are usually registered as factories via [`register_builder()`]. Factories are
/// only invoked when the launcher first needs the benchmarks, so nothing is constructed for a
/// process that never launches or lists anything.
///
/// [`register_builder()`]: Self::register_builder
///
/// # Examples
///
/// ```
/// use benchmarked::{Benchmark, CsvReporter, Filter, Launcher};
///
/// # fn main() -> Result<(), benchmarked::Error> {
/// let mut launcher = Launcher::new("sorting");
///
/// for size in [10_usize, 1000] {
///     launcher.register_builder(move || {
///         Benchmark::builder(format!("sort_{size}"))
///             .kind("sort")
///             .iterations(3)
///             .run(move |_| {
///                 let mut data: Vec<u64> = (0..size as u64).rev().collect();
///                 data.sort_unstable();
///                 std::hint::black_box(data);
///             })
///     });
/// }
///
/// let summary = launcher.launch(&Filter::new("sort_10", "")?);
/// assert_eq!(summary.launched(), ["sort_10"]);
///
/// let mut csv: Vec<u8> = Vec::new();
/// launcher.report(&mut CsvReporter::new(&mut csv))?;
/// # Ok(())
/// # }
/// ```
#[derive(derive_more::Debug)]
pub struct Launcher {
    name: String,

    #[debug(ignore)]
    builders: Vec<Box<dyn FnOnce() -> Benchmark>>,
    benchmarks: Vec<Benchmark>,
}

impl Launcher {
    /// Creates an empty launcher. The name is passed to reporters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            builders: Vec::new(),
            benchmarks: Vec::new(),
        }
    }

    /// The name of the launcher.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a factory that creates a benchmark when the launcher first needs it.
    pub fn register_builder(&mut self, builder: impl FnOnce() -> Benchmark + 'static) {
        self.builders.push(Box::new(builder));
    }

    /// Registers an already constructed benchmark.
    pub fn register_benchmark(&mut self, benchmark: Benchmark) {
        self.benchmarks.push(benchmark);
    }

    /// Removes all constructed benchmarks, including their results.
    pub fn clear_benchmarks(&mut self) {
        self.benchmarks.clear();
    }

    /// Removes all factories that have not been invoked yet.
    pub fn clear_builders(&mut self) {
        self.builders.clear();
    }

    /// The constructed benchmarks, in registration order.
    ///
    /// Benchmarks registered via factories only appear here after the first call to
    /// [`launch()`](Self::launch) or [`list()`](Self::list).
    #[must_use]
    pub fn benchmarks(&self) -> &[Benchmark] {
        &self.benchmarks
    }

    fn build_pending(&mut self) {
        if self.builders.is_empty() {
            return;
        }

        debug!(count = self.builders.len(), "building registered benchmarks");

        let built = self.builders.drain(..).map(|builder| builder());
        self.benchmarks.extend(built);
    }

    /// Returns the benchmarks selected by the filter without launching them.
    pub fn list(&mut self, filter: &Filter) -> Vec<&Benchmark> {
        self.build_pending();

        self.benchmarks
            .iter()
            .filter(|benchmark| filter.selects(benchmark))
            .collect()
    }

    /// Launches every benchmark selected by the filter, in registration order.
    ///
    /// A benchmark that fails or panics is logged and recorded in the returned summary; the
    /// remaining benchmarks still run. Selected benchmarks that were already launched are not
    /// run again and are listed in [`LaunchSummary::already_launched()`].
    pub fn launch(&mut self, filter: &Filter) -> LaunchSummary {
        self.build_pending();

        let mut summary = LaunchSummary::default();

        for benchmark in &mut self.benchmarks {
            if !filter.selects(benchmark) {
                summary.skipped.push(benchmark.name().to_owned());
                continue;
            }

            if benchmark.is_launched() {
                debug!(name = %benchmark.name(), "benchmark already launched");
                summary.already_launched.push(benchmark.name().to_owned());
                continue;
            }

            match launch_isolated(benchmark) {
                Ok(()) => summary.launched.push(benchmark.name().to_owned()),
                Err(error) => {
                    warn!(%error, "benchmark did not complete");
                    summary.failures.push(error);
                }
            }
        }

        info!(
            launcher = %self.name,
            launched = summary.launched.len(),
            skipped = summary.skipped.len(),
            already_launched = summary.already_launched.len(),
            failed = summary.failures.len(),
            "launch finished"
        );

        summary
    }

    /// Launches the benchmarks matching a name pattern and a type.
    ///
    /// Empty strings disable the corresponding criterion. See [`Filter`] for the matching rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] if the name pattern is not a valid regular expression.
    pub fn launch_matching(&mut self, name_pattern: &str, kind: &str) -> Result<LaunchSummary> {
        let filter = Filter::new(name_pattern, kind)?;
        Ok(self.launch(&filter))
    }

    /// Passes every launched benchmark to the reporter.
    ///
    /// Benchmarks that were filtered out or did not complete are left out.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the reporter.
    pub fn report(&self, reporter: &mut dyn Reporter) -> Result<()> {
        reporter.report_init(&self.name)?;

        for benchmark in self.benchmarks.iter().filter(|b| b.is_launched()) {
            reporter.report_benchmark(benchmark)?;
        }

        Ok(())
    }
}

/// Launches a benchmark, converting a panic into an error.
fn launch_isolated(benchmark: &mut Benchmark) -> Result<()> {
    let name = benchmark.name().to_owned();

    panic::catch_unwind(AssertUnwindSafe(|| benchmark.launch())).unwrap_or_else(|payload| {
        Err(Error::RunPanicked {
            name,
            message: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

/// Outcome of [`Launcher::launch()`].
#[derive(Debug, Default)]
pub struct LaunchSummary {
    launched: Vec<String>,
    skipped: Vec<String>,
    already_launched: Vec<String>,
    failures: Vec<Error>,
}

impl LaunchSummary {
    /// Names of the benchmarks that ran and completed every iteration during this launch.
    #[must_use]
    pub fn launched(&self) -> &[String] {
        &self.launched
    }

    /// Names of the benchmarks that the filter did not select.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Names of the selected benchmarks that were launched by an earlier call and therefore
    /// did not run again.
    #[must_use]
    pub fn already_launched(&self) -> &[String] {
        &self.already_launched
    }

    /// Errors of the selected benchmarks that did not complete.
    #[must_use]
    pub fn failures(&self) -> &[Error] {
        &self.failures
    }
}
