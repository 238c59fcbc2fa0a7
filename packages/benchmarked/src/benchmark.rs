use std::result;
use std::time::Duration;

use tracing::debug;

use crate::clock::Clock;
use crate::pal::PlatformFacade;
use crate::{ClockKind, Error, Fixture, Result, RoutineError};

/// The measured time of one benchmark iteration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IterationResult {
    cpu_time: Duration,
    wall_time: Duration,
}

impl IterationResult {
    pub(crate) fn new(cpu_time: Duration, wall_time: Duration) -> Self {
        Self {
            cpu_time,
            wall_time,
        }
    }

    /// Processor time consumed by the routine.
    #[must_use]
    pub fn cpu_time(&self) -> Duration {
        self.cpu_time
    }

    /// Wall-clock time elapsed while the routine ran.
    #[must_use]
    pub fn wall_time(&self) -> Duration {
        self.wall_time
    }
}

/// Callback that runs on the fixture before every measured iteration.
type CleanUp<F> = Box<dyn FnMut(&mut F)>;

/// The fixture-wrapped routine of a benchmark, with its concrete types erased.
trait Body {
    fn set_up(&mut self);
    fn initialize(&mut self);
    fn before_measurement(&mut self);
    fn run(&mut self) -> result::Result<(), RoutineError>;
    fn reset(&mut self);
    fn clean_up(&mut self);
}

struct FixtureBody<F, C, R> {
    fixture: F,
    before_measurement: Option<C>,
    routine: R,
}

impl<F, C, R> Body for FixtureBody<F, C, R>
where
    F: Fixture,
    C: FnMut(&mut F),
    R: FnMut(&mut F) -> result::Result<(), RoutineError>,
{
    fn set_up(&mut self) {
        self.fixture.set_up();
    }

    fn initialize(&mut self) {
        self.fixture.initialize();
    }

    fn before_measurement(&mut self) {
        if let Some(clean_up) = &mut self.before_measurement {
            clean_up(&mut self.fixture);
        }
    }

    fn run(&mut self) -> result::Result<(), RoutineError> {
        (self.routine)(&mut self.fixture)
    }

    fn reset(&mut self) {
        self.fixture.reset();
    }

    fn clean_up(&mut self) {
        self.fixture.clean_up();
    }
}

/// A routine that is measured for a fixed number of iterations.
///
/// Each iteration produces one [`IterationResult`] holding the processor time and the
/// wall-clock time of the routine. Fixture hooks and the per-iteration clean-up callback run
/// outside of the measured region.
///
/// A benchmark is launched at most once. If the routine fails, the results of the completed
/// iterations are kept but the benchmark is not marked as launched and is therefore left out
/// of reports. Launching it again discards those results and starts over.
///
/// # Examples
///
/// ```
/// use benchmarked::Benchmark;
///
/// # fn main() -> Result<(), benchmarked::Error> {
/// let mut benchmark = Benchmark::builder("sum")
///     .description("sum of the first thousand integers")
///     .iterations(3)
///     .run(|_| {
///         std::hint::black_box((0..1000_u64).sum::<u64>());
///     });
///
/// benchmark.launch()?;
///
/// assert!(benchmark.is_launched());
/// assert_eq!(benchmark.results().len(), 3);
/// # Ok(())
/// # }
/// ```
#[derive(derive_more::Debug)]
pub struct Benchmark {
    name: String,
    kind: String,
    description: String,
    iterations: u64,
    cpu_clock: ClockKind,
    results: Vec<IterationResult>,
    launched: bool,

    #[debug(ignore)]
    body: Box<dyn Body>,
    platform: PlatformFacade,
}

impl Benchmark {
    /// Starts configuring a benchmark with the given name.
    ///
    /// The benchmark runs 1 iteration with the empty fixture unless configured otherwise.
    pub fn builder(name: impl Into<String>) -> BenchmarkBuilder<()> {
        BenchmarkBuilder {
            name: name.into(),
            kind: String::new(),
            description: String::new(),
            iterations: 1,
            cpu_clock: ClockKind::ThreadCpu,
            fixture: (),
            before_measurement: None,
            platform: PlatformFacade::real(),
        }
    }

    /// The name the benchmark is selected and reported by.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type of the benchmark, matched exactly by [`Filter`](crate::Filter).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Free-form description included in reports.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The number of iterations the benchmark is configured to run.
    #[must_use]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// The clock used for the processor time of each iteration.
    #[must_use]
    pub fn cpu_clock(&self) -> ClockKind {
        self.cpu_clock
    }

    /// The results of the iterations completed so far, in execution order.
    #[must_use]
    pub fn results(&self) -> &[IterationResult] {
        &self.results
    }

    /// Whether every iteration has completed.
    #[must_use]
    pub fn is_launched(&self) -> bool {
        self.launched
    }

    /// Runs all iterations of the benchmark on the current thread.
    ///
    /// Does nothing if the benchmark has already been launched. The partial results of an
    /// earlier failed launch are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RunFailed`] if the routine returns an error. The iterations completed
    /// before the failure keep their results, and the benchmark is not marked as launched.
    pub fn launch(&mut self) -> Result<()> {
        if self.launched {
            debug!(name = %self.name, "benchmark already launched");
            return Ok(());
        }

        debug!(name = %self.name, iterations = self.iterations, "launching benchmark");

        self.results.clear();

        let wall_clock = Clock::new(ClockKind::Wall, self.platform.clone());
        let cpu_clock = Clock::new(self.cpu_clock, self.platform.clone());

        self.body.set_up();

        for _ in 0..self.iterations {
            self.body.initialize();
            self.body.before_measurement();

            let wall_start = wall_clock.now();
            let cpu_start = cpu_clock.now();

            let outcome = self.body.run();

            let cpu_end = cpu_clock.now();
            let wall_end = wall_clock.now();

            if let Err(source) = outcome {
                return Err(Error::RunFailed {
                    name: self.name.clone(),
                    source,
                });
            }

            self.results.push(IterationResult::new(
                Clock::elapsed(cpu_start, cpu_end),
                Clock::elapsed(wall_start, wall_end),
            ));

            self.body.reset();
        }

        self.body.clean_up();
        self.launched = true;

        Ok(())
    }
}

/// Configures a [`Benchmark`]. Created by [`Benchmark::builder()`].
#[derive(derive_more::Debug)]
#[must_use]
pub struct BenchmarkBuilder<F> {
    name: String,
    kind: String,
    description: String,
    iterations: u64,
    cpu_clock: ClockKind,

    #[debug(ignore)]
    fixture: F,
    #[debug(ignore)]
    before_measurement: Option<CleanUp<F>>,
    platform: PlatformFacade,
}

impl<F> BenchmarkBuilder<F>
where
    F: Fixture + 'static,
{
    /// Sets the type of the benchmark. Defaults to the empty string.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Sets the description shown in reports. Defaults to the empty string.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the number of iterations. Defaults to 1.
    ///
    /// # Panics
    ///
    /// Panics if `iterations` is zero.
    pub fn iterations(mut self, iterations: u64) -> Self {
        assert!(iterations != 0, "Iterations cannot be zero");

        self.iterations = iterations;
        self
    }

    /// Sets the clock that measures the processor time of each iteration.
    ///
    /// Defaults to [`ClockKind::ThreadCpu`]. Use [`ClockKind::TotalCpu`] for routines that
    /// hand work to other threads.
    ///
    /// # Panics
    ///
    /// Panics if `clock` is [`ClockKind::Wall`], which is always measured separately.
    pub fn cpu_clock(mut self, clock: ClockKind) -> Self {
        assert!(
            clock != ClockKind::Wall,
            "the processor time of a benchmark must be measured with a processor clock"
        );

        self.cpu_clock = clock;
        self
    }

    /// Sets the fixture whose hooks wrap the routine and which the routine works on.
    ///
    /// Replaces any previously configured clean-up callback.
    pub fn fixture<G>(self, fixture: G) -> BenchmarkBuilder<G>
    where
        G: Fixture + 'static,
    {
        BenchmarkBuilder {
            name: self.name,
            kind: self.kind,
            description: self.description,
            iterations: self.iterations,
            cpu_clock: self.cpu_clock,
            fixture,
            before_measurement: None,
            platform: self.platform,
        }
    }

    /// Sets a callback that runs before every iteration, after
    /// [`Fixture::initialize()`] and before measurement starts.
    ///
    /// Use it to discard the effects of the previous iteration without counting that cost.
    pub fn clean_up(mut self, clean_up: impl FnMut(&mut F) + 'static) -> Self {
        self.before_measurement = Some(Box::new(clean_up));
        self
    }

    #[cfg(test)]
    pub(crate) fn platform(mut self, platform: PlatformFacade) -> Self {
        self.platform = platform;
        self
    }

    /// Finishes the benchmark with an infallible routine.
    pub fn run(self, mut routine: impl FnMut(&mut F) + 'static) -> Benchmark {
        self.try_run(move |fixture| {
            routine(fixture);
            Ok(())
        })
    }

    /// Finishes the benchmark with a routine that can fail.
    ///
    /// A failing routine stops the benchmark; see [`Benchmark::launch()`].
    pub fn try_run(
        self,
        routine: impl FnMut(&mut F) -> result::Result<(), RoutineError> + 'static,
    ) -> Benchmark {
        Benchmark {
            name: self.name,
            kind: self.kind,
            description: self.description,
            iterations: self.iterations,
            cpu_clock: self.cpu_clock,
            results: Vec::new(),
            launched: false,
            body: Box::new(FixtureBody {
                fixture: self.fixture,
                before_measurement: self.before_measurement,
                routine,
            }),
            platform: self.platform,
        }
    }
}
