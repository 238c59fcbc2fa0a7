//! Clock source trait shared by the real and fake platforms.

use std::fmt::Debug;
use std::time::Duration;

/// Source of the raw clock readings used by every clock kind.
///
/// Each method returns the time elapsed since a clock-specific origin. Readings are only
/// comparable with other readings of the same method (and, for thread time, taken on the
/// same thread).
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Monotonic wall-clock time, comparable across threads.
    fn wall_time(&self) -> Duration;

    /// Processor time consumed by the calling thread.
    fn thread_time(&self) -> Duration;

    /// Processor time consumed by the whole process, summed over all threads.
    fn process_time(&self) -> Duration;
}
