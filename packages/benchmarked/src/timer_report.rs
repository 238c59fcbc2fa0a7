//! Snapshots of instrumentation timer data.

use std::fmt::{self, Write as _};
use std::time::Duration;

use crate::{ClockKind, ThreadKey};

/// Snapshot of the aggregated time of every instrumentation timer.
///
/// Created by [`Timers::to_report()`](crate::Timers::to_report). A report is a plain value that
/// can be sent to other threads, rendered as console text via [`Display`](fmt::Display) or as
/// a CSV table via [`to_csv()`](Self::to_csv).
///
/// Entries are ordered by clock kind, then by name. Within an entry, threads are ordered by
/// their [`ThreadKey`].
///
/// # Examples
///
/// ```
/// use benchmarked::{ClockKind, Timers};
///
/// # fn main() -> Result<(), benchmarked::Error> {
/// let timers = Timers::new();
/// timers.start("load", ClockKind::Wall)?;
/// timers.stop("load", ClockKind::Wall)?;
///
/// let report = timers.to_report();
/// for entry in report.entries() {
///     println!("{} ({}): {:?}", entry.name(), entry.clock(), entry.total());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct TimerReport {
    entries: Vec<TimerEntry>,
}

/// Aggregated time of one named timer on one clock kind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimerEntry {
    name: String,
    clock: ClockKind,
    threads: Vec<(ThreadKey, Duration)>,
}

impl TimerReport {
    pub(crate) fn new(mut entries: Vec<TimerEntry>) -> Self {
        entries.sort_by(|a, b| (a.clock, &a.name).cmp(&(b.clock, &b.name)));
        Self { entries }
    }

    /// Whether no timer has a completed region.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The timers in this report.
    pub fn entries(&self) -> impl Iterator<Item = &TimerEntry> {
        self.entries.iter()
    }

    /// Number of thread columns needed to hold the widest entry.
    fn width(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.threads.len())
            .max()
            .unwrap_or_default()
    }

    /// Renders the report as a CSV table.
    ///
    /// Every row holds the clock kind, the timer name and the total nanoseconds of each thread.
    /// Rows with fewer threads than the widest row are padded with empty cells so that the
    /// table is rectangular.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let width = self.width();
        let mut csv = String::from("clock,name");

        for column in 1..=width {
            write!(csv, ",thread-{column}").expect("writing to a String cannot fail");
        }
        csv.push('\n');

        for entry in &self.entries {
            write!(csv, "{},{}", entry.clock, entry.name).expect("writing to a String cannot fail");

            for column in 0..width {
                csv.push(',');

                if let Some((_, total)) = entry.threads.get(column) {
                    write!(csv, "{}", total.as_nanos()).expect("writing to a String cannot fail");
                }
            }
            csv.push('\n');
        }

        csv
    }

    /// Prints the report to stdout.
    ///
    /// Prints nothing if no timer has a completed region, so instrumented code that never ran
    /// leaves the output untouched.
    #[cfg_attr(test, mutants::skip)] // Writes to stdout, covered by the Display tests.
    pub fn print_to_stdout(&self) {
        if self.is_empty() {
            return;
        }

        println!("{self}");
    }
}

impl TimerEntry {
    pub(crate) fn new(name: String, clock: ClockKind, threads: Vec<(ThreadKey, Duration)>) -> Self {
        Self {
            name,
            clock,
            threads,
        }
    }

    /// The name of the timer.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The clock kind the timer measured with.
    #[must_use]
    pub fn clock(&self) -> ClockKind {
        self.clock
    }

    /// Total time of the completed regions on each timeline, ordered by thread key.
    #[must_use]
    pub fn threads(&self) -> &[(ThreadKey, Duration)] {
        &self.threads
    }

    /// Total time of the completed regions summed over all timelines.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.threads.iter().map(|(_, total)| *total).sum()
    }
}

impl fmt::Display for TimerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.name)?;

        for (index, (thread, total)) in self.threads.iter().enumerate() {
            let separator = if index == 0 { " " } else { ", " };
            write!(f, "{separator}{total:?} ({thread})")?;
        }

        write!(f, "; total {:?}", self.total())
    }
}

impl fmt::Display for TimerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No timer statistics captured.");
        }

        writeln!(f, "Timer statistics:")?;

        for clock in ClockKind::ALL {
            let mut entries = self.entries.iter().filter(|entry| entry.clock == clock).peekable();

            if entries.peek().is_none() {
                continue;
            }

            writeln!(f, "  {}:", clock.title())?;
            for entry in entries {
                writeln!(f, "    {entry}")?;
            }
        }

        Ok(())
    }
}
