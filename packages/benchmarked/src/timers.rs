use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::ledger::IntervalLedger;
use crate::pal::PlatformFacade;
use crate::{ClockKind, ERR_POISONED_LOCK, OutputFormat, Result, ThreadKey, TimerEntry, TimerReport};

/// Registry of named instrumentation timers.
///
/// A timer is identified by a name and a [`ClockKind`] and is created the first time it is
/// referenced. Every timer records its regions separately per thread (or on the single
/// process-wide timeline for [`ClockKind::TotalCpu`]).
///
/// Starting and stopping only locks the registry long enough to find the timer, then locks
/// the timer long enough to append or close one region. No lock is held while the measured
/// code runs.
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// use benchmarked::{ClockKind, Timers};
///
/// let timers = Timers::new();
///
/// thread::scope(|s| {
///     for _ in 0..2 {
///         s.spawn(|| {
///             timers.start("work", ClockKind::ThreadCpu).unwrap();
///             std::hint::black_box((0..10_000_u64).sum::<u64>());
///             timers.stop("work", ClockKind::ThreadCpu).unwrap();
///         });
///     }
/// });
///
/// let report = timers.to_report();
/// let entry = report.entries().next().unwrap();
/// assert_eq!(entry.threads().len(), 2);
/// ```
#[derive(Debug)]
pub struct Timers {
    ledgers: Mutex<HashMap<ClockKind, HashMap<String, Arc<IntervalLedger>>>>,
    platform: PlatformFacade,
}

impl Timers {
    /// Creates an empty timer registry.
    #[expect(
        clippy::new_without_default,
        reason = "a registry is explicit shared state, construction should be visible"
    )]
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(PlatformFacade::real())
    }

    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        Self {
            ledgers: Mutex::new(HashMap::new()),
            platform,
        }
    }

    fn ledger(&self, name: &str, kind: ClockKind) -> Arc<IntervalLedger> {
        let mut ledgers = self.ledgers.lock().expect(ERR_POISONED_LOCK);
        let by_name = ledgers.entry(kind).or_default();

        if let Some(ledger) = by_name.get(name) {
            return Arc::clone(ledger);
        }

        debug!(name, clock = %kind, "creating timer");

        let ledger = Arc::new(IntervalLedger::new(
            name.to_owned(),
            Clock::new(kind, self.platform.clone()),
        ));
        by_name.insert(name.to_owned(), Arc::clone(&ledger));
        ledger
    }

    /// Starts a region of the named timer on the current thread's timeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyOpen`](crate::Error::AlreadyOpen) if a region of the same timer
    /// is already running on the same timeline.
    pub fn start(&self, name: &str, kind: ClockKind) -> Result<()> {
        self.start_on(name, kind, kind.thread_key())
    }

    /// Stops the running region of the named timer on the current thread's timeline.
    ///
    /// Stopping a timer that was never started on this timeline does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOpen`](crate::Error::NotOpen) if the last region of the timer on
    /// this timeline was already stopped.
    pub fn stop(&self, name: &str, kind: ClockKind) -> Result<()> {
        self.stop_on(name, kind, kind.thread_key())
    }

    pub(crate) fn start_on(&self, name: &str, kind: ClockKind, thread: ThreadKey) -> Result<()> {
        self.ledger(name, kind).open(thread)
    }

    pub(crate) fn stop_on(&self, name: &str, kind: ClockKind, thread: ThreadKey) -> Result<()> {
        self.ledger(name, kind).close(thread)
    }

    /// Starts a region that is stopped when the returned scope is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyOpen`](crate::Error::AlreadyOpen) if a region of the same timer
    /// is already running on the same timeline.
    ///
    /// # Examples
    ///
    /// ```
    /// use benchmarked::{ClockKind, Timers};
    ///
    /// # fn main() -> Result<(), benchmarked::Error> {
    /// let timers = Timers::new();
    /// {
    ///     let _scope = timers.scope("checksum", ClockKind::Wall)?;
    ///     std::hint::black_box((0..1000_u32).fold(0_u32, u32::wrapping_add));
    /// }
    /// assert!(!timers.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn scope(&self, name: &str, kind: ClockKind) -> Result<TimerScope> {
        let ledger = self.ledger(name, kind);
        let thread = kind.thread_key();

        ledger.open(thread)?;

        Ok(TimerScope {
            ledger,
            thread,
            _single_threaded: PhantomData,
        })
    }

    /// Creates a snapshot of the aggregated time of every timer.
    ///
    /// Regions that are still running are not included. The snapshot can be taken while other
    /// threads keep starting and stopping timers.
    #[expect(
        clippy::needless_collect,
        reason = "collecting releases the registry lock before any ledger is locked"
    )]
    #[must_use]
    pub fn to_report(&self) -> TimerReport {
        // Collect the ledgers first so the registry lock is not held while aggregating.
        let ledgers: Vec<(String, Arc<IntervalLedger>)> = self
            .ledgers
            .lock()
            .expect(ERR_POISONED_LOCK)
            .values()
            .flat_map(|by_name| {
                by_name
                    .iter()
                    .map(|(name, ledger)| (name.clone(), Arc::clone(ledger)))
            })
            .collect();

        let entries = ledgers
            .into_iter()
            .filter_map(|(name, ledger)| {
                let threads = ledger.aggregate();
                (!threads.is_empty())
                    .then(|| TimerEntry::new(name, ledger.kind(), threads.into_iter().collect()))
            })
            .collect();

        TimerReport::new(entries)
    }

    /// Renders the aggregated time of every timer in the requested format.
    #[must_use]
    pub fn report(&self, format: OutputFormat) -> String {
        let report = self.to_report();

        match format {
            OutputFormat::Console => report.to_string(),
            OutputFormat::Csv => report.to_csv(),
        }
    }

    /// Whether no timer has a completed region.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_report().is_empty()
    }
}

/// A running timer region that is stopped when dropped.
///
/// The region belongs to the timeline of the thread that created the scope, so the scope
/// cannot be moved to another thread.
#[derive(Debug)]
#[must_use = "the region is stopped when the scope is dropped"]
pub struct TimerScope {
    ledger: Arc<IntervalLedger>,
    thread: ThreadKey,

    _single_threaded: PhantomData<*const ()>,
}

impl Drop for TimerScope {
    fn drop(&mut self) {
        if let Err(error) = self.ledger.close(self.thread) {
            warn!(%error, "timer scope could not stop its region");
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::Error;
    use crate::pal::FakePlatform;

    fn fake_timers() -> (Timers, FakePlatform) {
        let fake = FakePlatform::new();
        (Timers::with_platform(PlatformFacade::fake(fake.clone())), fake)
    }

    #[test]
    fn unknown_timer_is_created_on_first_use() {
        let (timers, fake) = fake_timers();

        timers.start("new", ClockKind::Wall).unwrap();
        fake.advance(Duration::from_millis(4));
        timers.stop("new", ClockKind::Wall).unwrap();

        let report = timers.to_report();
        let entry = report.entries().next().unwrap();
        assert_eq!(entry.name(), "new");
        assert_eq!(entry.clock(), ClockKind::Wall);
        assert_eq!(entry.total(), Duration::from_millis(4));
    }

    #[test]
    fn clock_kinds_and_names_are_isolated() {
        let (timers, _fake) = fake_timers();

        timers.start("x", ClockKind::ThreadCpu).unwrap();

        // Neither the same name on another clock nor another name on the same clock is open.
        timers.start("x", ClockKind::Wall).unwrap();
        timers.start("y", ClockKind::ThreadCpu).unwrap();

        timers.stop("x", ClockKind::Wall).unwrap();
        timers.stop("y", ClockKind::ThreadCpu).unwrap();

        // The first region is still open.
        assert!(matches!(
            timers.start("x", ClockKind::ThreadCpu),
            Err(Error::AlreadyOpen { .. })
        ));
        timers.stop("x", ClockKind::ThreadCpu).unwrap();
    }

    #[test]
    fn total_cpu_is_shared_between_threads() {
        let (timers, _fake) = fake_timers();

        timers.start("all", ClockKind::TotalCpu).unwrap();

        thread::scope(|s| {
            s.spawn(|| {
                assert!(matches!(
                    timers.start("all", ClockKind::TotalCpu),
                    Err(Error::AlreadyOpen { .. })
                ));

                // Any thread may close the process-wide region.
                timers.stop("all", ClockKind::TotalCpu).unwrap();
            });
        });

        let report = timers.to_report();
        let entry = report.entries().next().unwrap();
        assert_eq!(entry.threads().len(), 1);
        assert!(entry.threads().first().unwrap().0.is_process());
    }

    #[test]
    fn per_thread_clocks_are_keyed_by_thread() {
        let (timers, _fake) = fake_timers();

        timers.start("work", ClockKind::Wall).unwrap();

        thread::scope(|s| {
            s.spawn(|| {
                // Another thread has its own timeline.
                timers.start("work", ClockKind::Wall).unwrap();
                timers.stop("work", ClockKind::Wall).unwrap();
            });
        });

        timers.stop("work", ClockKind::Wall).unwrap();

        let report = timers.to_report();
        let entry = report.entries().next().unwrap();
        assert_eq!(entry.threads().len(), 2);
    }

    #[test]
    fn stop_without_start_is_ignored() {
        let (timers, _fake) = fake_timers();

        timers.stop("never", ClockKind::ThreadCpu).unwrap();

        assert!(timers.is_empty());
    }

    #[test]
    fn scope_stops_on_drop() {
        let (timers, fake) = fake_timers();

        {
            let _scope = timers.scope("scoped", ClockKind::ThreadCpu).unwrap();
            fake.advance(Duration::from_millis(9));
        }

        let report = timers.to_report();
        assert_eq!(
            report.entries().next().unwrap().total(),
            Duration::from_millis(9)
        );

        // The region is closed, so a new one can start.
        timers.start("scoped", ClockKind::ThreadCpu).unwrap();
    }

    #[test]
    fn scope_reports_start_conflict() {
        let (timers, _fake) = fake_timers();

        timers.start("busy", ClockKind::Wall).unwrap();

        assert!(matches!(
            timers.scope("busy", ClockKind::Wall),
            Err(Error::AlreadyOpen { .. })
        ));
    }

    #[test]
    fn report_renders_both_formats() {
        let (timers, fake) = fake_timers();

        timers.start_on("a", ClockKind::Wall, ThreadKey::PROCESS).unwrap();
        fake.advance(Duration::from_nanos(250));
        timers.stop_on("a", ClockKind::Wall, ThreadKey::PROCESS).unwrap();

        let console = timers.report(OutputFormat::Console);
        assert!(console.contains("Wall"), "{console}");
        assert!(console.contains("a:"), "{console}");

        let csv = timers.report(OutputFormat::Csv);
        assert_eq!(csv, "clock,name,thread-1\nwall,a,250\n");
    }

    static_assertions::assert_impl_all!(Timers: Send, Sync);
    static_assertions::assert_not_impl_any!(TimerScope: Send, Sync);
}
