//! Clock kinds, timestamps and thread identity.

use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::pal::{Platform, PlatformFacade};

/// The time source a measurement is taken with.
///
/// The discriminants are part of the instrumentation boundary: callers that identify clock
/// kinds numerically can convert with [`ClockKind::try_from()`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
#[non_exhaustive]
pub enum ClockKind {
    /// Processor time consumed by the calling thread.
    ///
    /// Readings from different threads are not comparable, so regions are kept per thread.
    ThreadCpu = 0,

    /// Processor time consumed by the whole process.
    ///
    /// There is exactly one timeline for this clock regardless of how many threads use it,
    /// so all threads share the [`ThreadKey::PROCESS`] key.
    TotalCpu = 1,

    /// Monotonic wall-clock time.
    Wall = 2,
}

impl ClockKind {
    /// All clock kinds, in report order.
    pub const ALL: [Self; 3] = [Self::ThreadCpu, Self::TotalCpu, Self::Wall];

    /// The key of the timeline that a region measured on the current thread belongs to.
    #[must_use]
    pub fn thread_key(self) -> ThreadKey {
        match self {
            Self::TotalCpu => ThreadKey::PROCESS,
            Self::ThreadCpu | Self::Wall => ThreadKey::current(),
        }
    }

    /// Human-readable title used for report sections.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::ThreadCpu => "Thread CPU",
            Self::TotalCpu => "Total CPU",
            Self::Wall => "Wall",
        }
    }
}

impl fmt::Display for ClockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ThreadCpu => "thread-cpu",
            Self::TotalCpu => "total-cpu",
            Self::Wall => "wall",
        };

        f.write_str(name)
    }
}

impl TryFrom<u8> for ClockKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::ThreadCpu),
            1 => Ok(Self::TotalCpu),
            2 => Ok(Self::Wall),
            other => Err(other),
        }
    }
}

/// Identifies the timeline that a timer region was recorded on.
///
/// Every thread receives a process-unique key the first time it asks for one. Keys are never
/// reused, even after the thread exits. [`ThreadKey::PROCESS`] is reserved for the single
/// process-wide timeline of [`ClockKind::TotalCpu`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ThreadKey(u64);

static NEXT_THREAD_KEY: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_THREAD_KEY: Cell<Option<ThreadKey>> = const { Cell::new(None) };
}

impl ThreadKey {
    /// The reserved key of the process-wide timeline.
    pub const PROCESS: Self = Self(0);

    /// The key of the calling thread.
    #[must_use]
    pub fn current() -> Self {
        CURRENT_THREAD_KEY.with(|cell| {
            if let Some(key) = cell.get() {
                return key;
            }

            // Relaxed is enough, we only need uniqueness, not ordering with other memory.
            let key = Self(NEXT_THREAD_KEY.fetch_add(1, Ordering::Relaxed));
            cell.set(Some(key));
            key
        })
    }

    #[cfg(test)]
    pub(crate) fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// The numeric value of the key. Zero is the process-wide timeline.
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Whether this is the reserved process-wide key.
    #[must_use]
    pub fn is_process(self) -> bool {
        self == Self::PROCESS
    }
}

impl fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_process() {
            f.write_str("process")
        } else {
            write!(f, "thread {}", self.0)
        }
    }
}

/// An opaque reading of one clock.
///
/// Timestamps are only meaningful relative to other timestamps taken from the same clock
/// (and, for [`ClockKind::ThreadCpu`], on the same thread).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct Timestamp(Duration);

impl Timestamp {
    #[cfg(test)]
    pub(crate) fn from_duration(duration: Duration) -> Self {
        Self(duration)
    }
}

/// Reads one kind of clock.
#[derive(Clone, Debug)]
pub(crate) struct Clock {
    kind: ClockKind,
    platform: PlatformFacade,
}

impl Clock {
    pub(crate) fn new(kind: ClockKind, platform: PlatformFacade) -> Self {
        Self { kind, platform }
    }

    pub(crate) fn kind(&self) -> ClockKind {
        self.kind
    }

    pub(crate) fn now(&self) -> Timestamp {
        Timestamp(match self.kind {
            ClockKind::ThreadCpu => self.platform.thread_time(),
            ClockKind::TotalCpu => self.platform.process_time(),
            ClockKind::Wall => self.platform.wall_time(),
        })
    }

    /// Time elapsed between two readings of this clock.
    ///
    /// Returns zero if `end` is earlier than `start`, which some processor time sources
    /// can report at very fine granularity.
    pub(crate) fn elapsed(start: Timestamp, end: Timestamp) -> Duration {
        end.0.saturating_sub(start.0)
    }
}
