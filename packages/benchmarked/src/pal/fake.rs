//! Fake clock source with manually advanced readings, for tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pal::abstractions::Platform;

#[derive(Debug, Default)]
struct FakePlatformState {
    wall_time: Duration,
    thread_time: Duration,
    process_time: Duration,
}

/// Fake implementation of the platform abstraction for testing.
///
/// Clones share the same clock values, so a test can keep one clone and advance time
/// while the code under test reads from another.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    state: Arc<Mutex<FakePlatformState>>,
}

impl FakePlatform {
    /// Creates a new fake platform with every clock at zero.
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakePlatformState::default())),
        }
    }

    pub(crate) fn set_wall_time(&self, time: Duration) {
        self.state
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
            .wall_time = time;
    }

    pub(crate) fn set_thread_time(&self, time: Duration) {
        self.state
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
            .thread_time = time;
    }

    pub(crate) fn set_process_time(&self, time: Duration) {
        self.state
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
            .process_time = time;
    }

    /// Sets all three clocks to the same value.
    pub(crate) fn set_all(&self, time: Duration) {
        let mut state = self
            .state
            .lock()
            .expect("FakePlatform state lock should not be poisoned");

        state.wall_time = time;
        state.thread_time = time;
        state.process_time = time;
    }

    /// Moves all three clocks forward by the same amount.
    pub(crate) fn advance(&self, delta: Duration) {
        let mut state = self
            .state
            .lock()
            .expect("FakePlatform state lock should not be poisoned");

        state.wall_time = state.wall_time.saturating_add(delta);
        state.thread_time = state.thread_time.saturating_add(delta);
        state.process_time = state.process_time.saturating_add(delta);
    }
}

impl Platform for FakePlatform {
    fn wall_time(&self) -> Duration {
        self.state
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
            .wall_time
    }

    fn thread_time(&self) -> Duration {
        self.state
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
            .thread_time
    }

    fn process_time(&self) -> Duration {
        self.state
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
            .process_time
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn initializes_with_zero_time() {
        let platform = FakePlatform::new();
        assert_eq!(platform.wall_time(), Duration::ZERO);
        assert_eq!(platform.thread_time(), Duration::ZERO);
        assert_eq!(platform.process_time(), Duration::ZERO);
    }

    #[test]
    fn advance_moves_every_clock() {
        let platform = FakePlatform::new();
        platform.set_thread_time(Duration::from_millis(10));
        platform.advance(Duration::from_millis(5));

        assert_eq!(platform.wall_time(), Duration::from_millis(5));
        assert_eq!(platform.thread_time(), Duration::from_millis(15));
        assert_eq!(platform.process_time(), Duration::from_millis(5));
    }

    #[test]
    fn shared_state_between_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();

        platform1.set_wall_time(Duration::from_millis(100));
        assert_eq!(platform2.wall_time(), Duration::from_millis(100));

        platform2.set_all(Duration::from_millis(200));
        assert_eq!(platform1.process_time(), Duration::from_millis(200));
        assert_eq!(platform1.thread_time(), Duration::from_millis(200));
    }
}
