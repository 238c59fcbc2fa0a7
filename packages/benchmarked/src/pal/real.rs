//! Clock source backed by the operating system.

use std::time::{Duration, Instant};

use cpu_time::{ProcessTime, ThreadTime};

use crate::pal::abstractions::Platform;

/// Real implementation of the platform abstraction using operating system clocks.
///
/// Wall-clock readings are measured from the moment the platform was created.
#[derive(Clone, Debug)]
pub(crate) struct RealPlatform {
    wall_origin: Instant,
}

impl RealPlatform {
    pub(crate) fn new() -> Self {
        Self {
            wall_origin: Instant::now(),
        }
    }
}

impl Platform for RealPlatform {
    fn wall_time(&self) -> Duration {
        self.wall_origin.elapsed()
    }

    fn thread_time(&self) -> Duration {
        ThreadTime::now().as_duration()
    }

    fn process_time(&self) -> Duration {
        ProcessTime::now().as_duration()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::hint::black_box;

    use super::*;

    #[test]
    #[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
    fn wall_time_is_monotonic() {
        let platform = RealPlatform::new();

        let first = platform.wall_time();
        let second = platform.wall_time();

        assert!(second >= first);
    }

    #[test]
    #[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
    fn thread_time_is_monotonic() {
        let platform = RealPlatform::new();

        let first = platform.thread_time();
        black_box((0..10_000_u64).sum::<u64>());
        let second = platform.thread_time();

        assert!(second >= first);
    }
}
