use std::{error, io, result};

use thiserror::Error;

use crate::{ClockKind, ThreadKey};

/// Boxed error returned by fallible benchmark routines.
pub type RoutineError = Box<dyn error::Error + Send + Sync + 'static>;

/// Errors that can occur when measuring, launching or reporting benchmarks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A timer region was started while the previous region on the same timeline was still open.
    ///
    /// This indicates a programming error in the instrumented code: the same named region
    /// was started twice without being stopped in between.
    #[error("timer '{name}' ({clock}) is already running on {thread}")]
    AlreadyOpen {
        /// Name of the timer.
        name: String,

        /// Clock kind of the timer.
        clock: ClockKind,

        /// Timeline on which the region is already open.
        thread: ThreadKey,
    },

    /// A timer region was stopped although the last region on the same timeline was
    /// already stopped.
    #[error("timer '{name}' ({clock}) was stopped on {thread} without a matching start")]
    NotOpen {
        /// Name of the timer.
        name: String,

        /// Clock kind of the timer.
        clock: ClockKind,

        /// Timeline on which no region is open.
        thread: ThreadKey,
    },

    /// Statistics were requested over an empty sample set.
    #[error("cannot calculate statistics over an empty sample set")]
    EmptySamples,

    /// The benchmark name filter is not a valid regular expression.
    #[error("invalid benchmark name filter '{pattern}': {source}")]
    InvalidFilter {
        /// The pattern as supplied by the caller.
        pattern: String,

        /// The underlying parse error.
        source: regex::Error,
    },

    /// An output format name was not recognized.
    #[error("unknown output format '{value}', expected 'console' or 'csv'")]
    UnknownOutputFormat {
        /// The name as supplied by the caller.
        value: String,
    },

    /// A benchmark routine returned an error.
    #[error("benchmark '{name}' failed: {source}")]
    RunFailed {
        /// Name of the benchmark.
        name: String,

        /// The error returned by the routine.
        source: RoutineError,
    },

    /// A benchmark routine or one of its fixture hooks panicked.
    #[error("benchmark '{name}' panicked: {message}")]
    RunPanicked {
        /// Name of the benchmark.
        name: String,

        /// The panic payload, if it was a string.
        message: String,
    },

    /// Writing a report failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A specialized `Result` type for benchmark operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = result::Result<T, Error>;
