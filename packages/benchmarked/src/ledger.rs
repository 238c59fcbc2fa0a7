//! Per-thread record of the regions measured by one named timer.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use tracing::trace;

use crate::clock::{Clock, Timestamp};
use crate::{ClockKind, ERR_POISONED_LOCK, Error, Result, ThreadKey};

/// One start/stop pair measured with a single clock.
///
/// A region is open until it is closed, and closing is a one-shot transition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct TimedRegion {
    start: Timestamp,
    end: Option<Timestamp>,
}

impl TimedRegion {
    fn open(start: Timestamp) -> Self {
        Self { start, end: None }
    }

    fn is_open(&self) -> bool {
        self.end.is_none()
    }

    fn elapsed(&self) -> Option<Duration> {
        self.end.map(|end| Clock::elapsed(self.start, end))
    }
}

/// Ordered regions of one named timer, kept separately for every timeline.
///
/// The lock only guards the container. Clock readings are taken before the lock is acquired
/// and the lock is never held while instrumented code runs.
#[derive(Debug)]
pub(crate) struct IntervalLedger {
    name: String,
    clock: Clock,
    regions: Mutex<HashMap<ThreadKey, Vec<TimedRegion>>>,
}

impl IntervalLedger {
    pub(crate) fn new(name: String, clock: Clock) -> Self {
        Self {
            name,
            clock,
            regions: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn kind(&self) -> ClockKind {
        self.clock.kind()
    }

    /// Opens a new region on the given timeline.
    ///
    /// Fails if the last region on that timeline is still open.
    pub(crate) fn open(&self, thread: ThreadKey) -> Result<()> {
        let now = self.clock.now();

        let mut regions = self.regions.lock().expect(ERR_POISONED_LOCK);
        let timeline = regions.entry(thread).or_default();

        if timeline.last().is_some_and(TimedRegion::is_open) {
            return Err(Error::AlreadyOpen {
                name: self.name.clone(),
                clock: self.clock.kind(),
                thread,
            });
        }

        timeline.push(TimedRegion::open(now));
        drop(regions);

        trace!(name = %self.name, clock = %self.clock.kind(), %thread, "region opened");
        Ok(())
    }

    /// Closes the open region on the given timeline.
    ///
    /// Closing a timeline that has never been opened does nothing. Fails if the last region on
    /// the timeline is already closed.
    pub(crate) fn close(&self, thread: ThreadKey) -> Result<()> {
        let now = self.clock.now();

        let mut regions = self.regions.lock().expect(ERR_POISONED_LOCK);

        let Some(last) = regions.get_mut(&thread).and_then(|timeline| timeline.last_mut()) else {
            return Ok(());
        };

        if !last.is_open() {
            return Err(Error::NotOpen {
                name: self.name.clone(),
                clock: self.clock.kind(),
                thread,
            });
        }

        last.end = Some(now);
        drop(regions);

        trace!(name = %self.name, clock = %self.clock.kind(), %thread, "region closed");
        Ok(())
    }

    /// Total elapsed time of the closed regions on every timeline.
    ///
    /// Regions that are still open contribute nothing. Timelines without any closed region
    /// are omitted.
    pub(crate) fn aggregate(&self) -> BTreeMap<ThreadKey, Duration> {
        let regions = self.regions.lock().expect(ERR_POISONED_LOCK);

        regions
            .iter()
            .filter_map(|(thread, timeline)| {
                let mut closed = timeline.iter().filter_map(TimedRegion::elapsed).peekable();
                closed.peek()?;

                let total = closed.fold(Duration::ZERO, |total, elapsed| {
                    total.checked_add(elapsed).expect(
                        "timer total overflows Duration - this indicates an unrealistic scenario",
                    )
                });

                Some((*thread, total))
            })
            .collect()
    }
}
