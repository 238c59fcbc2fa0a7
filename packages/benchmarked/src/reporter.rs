use std::fmt::Display;
use std::io::Write;
use std::time::Duration;

use crate::{Benchmark, IterationResult, Result, Summary, SystemInfo};

const RULE: &str =
    "================================================================================";
const SEPARATOR: &str =
    "--------------------------------------------------------------------------------";

/// Header row of [`CsvReporter`] output, in column order.
const CSV_COLUMNS: [&str; 13] = [
    "name",
    "description",
    "iterations",
    "cpu-min[ns]",
    "cpu-max[ns]",
    "cpu-mean[ns]",
    "cpu-median[ns]",
    "cpu-%err",
    "wall-min[ns]",
    "wall-max[ns]",
    "wall-mean[ns]",
    "wall-median[ns]",
    "wall-%err",
];

/// Receives the results of launched benchmarks from [`Launcher::report()`].
///
/// [`Launcher::report()`]: crate::Launcher::report
pub trait Reporter {
    /// Called once before any benchmark is reported.
    ///
    /// # Errors
    ///
    /// Implementations return an error if the report cannot be written.
    fn report_init(&mut self, launcher_name: &str) -> Result<()>;

    /// Called once for every launched benchmark, in registration order.
    ///
    /// # Errors
    ///
    /// Implementations return an error if the report cannot be written.
    fn report_benchmark(&mut self, benchmark: &Benchmark) -> Result<()>;
}

/// Processor and wall-clock summaries of one benchmark.
///
/// Samples of zero are left out because they mean the clock did not advance at all, which is
/// what a clock reports when it is not available. A kind without any remaining samples has no
/// summary.
struct Measurements {
    cpu: Option<Summary>,
    wall: Option<Summary>,
}

impl Measurements {
    fn of(results: &[IterationResult]) -> Result<Self> {
        Ok(Self {
            cpu: summarize(results.iter().map(IterationResult::cpu_time))?,
            wall: summarize(results.iter().map(IterationResult::wall_time))?,
        })
    }
}

fn summarize(samples: impl Iterator<Item = Duration>) -> Result<Option<Summary>> {
    let samples: Vec<Duration> = samples.filter(|sample| !sample.is_zero()).collect();

    if samples.is_empty() {
        return Ok(None);
    }

    Summary::from_durations(&samples).map(Some)
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn or_unknown(value: Option<impl Display>) -> String {
    value.map_or_else(|| "unknown".to_owned(), |value| value.to_string())
}

/// Writes a human-readable report, headed by a description of the hardware.
///
/// Benchmarks with a single iteration show the measured times directly. Benchmarks with more
/// iterations show the minimum, maximum, mean and median in milliseconds, followed by the
/// median absolute deviation as a percentage of the median.
///
/// # Examples
///
/// ```
/// use benchmarked::{ConsoleReporter, Reporter, SystemProfile};
///
/// # fn main() -> Result<(), benchmarked::Error> {
/// let mut output: Vec<u8> = Vec::new();
///
/// let mut reporter = ConsoleReporter::new(&mut output, SystemProfile::default());
/// reporter.report_init("demo")?;
/// drop(reporter);
///
/// let text = String::from_utf8(output).unwrap();
/// assert!(text.contains("Benchmark report: demo"));
/// # Ok(())
/// # }
/// ```
#[derive(derive_more::Debug)]
pub struct ConsoleReporter<W> {
    #[debug(ignore)]
    writer: W,

    #[debug(ignore)]
    system: Box<dyn SystemInfo>,
}

impl<W> ConsoleReporter<W>
where
    W: Write,
{
    /// Creates a reporter that writes to `writer` and describes the hardware with `system`.
    pub fn new(writer: W, system: impl SystemInfo + 'static) -> Self {
        Self {
            writer,
            system: Box::new(system),
        }
    }

    fn write_summary(&mut self, title: &str, summary: &Summary) -> Result<()> {
        writeln!(self.writer, "  {title}")?;
        writeln!(self.writer, "  min:           {:.6}ms", millis(summary.min()))?;
        writeln!(self.writer, "  max:           {:.6}ms", millis(summary.max()))?;
        writeln!(self.writer, "  mean:          {:.6}ms", millis(summary.mean()))?;
        writeln!(self.writer, "  median:        {:.6}ms", millis(summary.median()))?;
        writeln!(self.writer, "  % err:         {:.2}", summary.mad_percent())?;

        Ok(())
    }
}

impl<W> Reporter for ConsoleReporter<W>
where
    W: Write,
{
    fn report_init(&mut self, launcher_name: &str) -> Result<()> {
        let system = &self.system;

        #[expect(
            clippy::cast_precision_loss,
            reason = "memory sizes are shown with two decimals, far below f64 precision"
        )]
        let ram_gib = system
            .total_ram_bytes()
            .map(|bytes| format!("{:.2}", bytes as f64 / 1024.0 / 1024.0 / 1024.0));

        writeln!(self.writer)?;
        writeln!(self.writer, "Benchmark report: {launcher_name}")?;
        writeln!(self.writer, "{RULE}")?;
        writeln!(self.writer, "--- Hardware ---")?;
        writeln!(
            self.writer,
            "CPU model:       {}",
            or_unknown(system.cpu_model())
        )?;
        writeln!(
            self.writer,
            "CPU cores:       {} ({})",
            or_unknown(system.logical_cores()),
            or_unknown(system.physical_cores())
        )?;
        writeln!(
            self.writer,
            "CPU clock speed: {} ({}) MHz",
            or_unknown(system.regular_clock_mhz()),
            or_unknown(system.max_clock_mhz())
        )?;
        writeln!(self.writer, "RAM size:        {} GiB", or_unknown(ram_gib))?;
        writeln!(self.writer, "{RULE}")?;
        writeln!(self.writer, "--- Benchmarks ---")?;
        self.writer.flush()?;

        Ok(())
    }

    fn report_benchmark(&mut self, benchmark: &Benchmark) -> Result<()> {
        writeln!(self.writer, "{SEPARATOR}")?;
        writeln!(self.writer, "Benchmark:       {}", benchmark.name())?;
        writeln!(self.writer, "Description:     {}", benchmark.description())?;
        writeln!(self.writer, "Iterations:      {}", benchmark.iterations())?;

        if benchmark.results().is_empty() {
            writeln!(self.writer, "No results collected.")?;
            self.writer.flush()?;
            return Ok(());
        }

        let measurements = Measurements::of(benchmark.results())?;

        if benchmark.iterations() > 1 {
            if let Some(cpu) = &measurements.cpu {
                self.write_summary("--- CPU time ---", cpu)?;
            }

            if let Some(wall) = &measurements.wall {
                self.write_summary("--- Wall time ---", wall)?;
            }
        } else {
            // With one sample, the median is the sample itself.
            if let Some(cpu) = &measurements.cpu {
                writeln!(self.writer, "  cpu time:      {:.6}ms", millis(cpu.median()))?;
            }

            if let Some(wall) = &measurements.wall {
                writeln!(self.writer, "  wall time:     {:.6}ms", millis(wall.median()))?;
            }
        }

        self.writer.flush()?;

        Ok(())
    }
}

/// Writes one row of separated values per benchmark.
///
/// The header row is written by [`report_init()`](Reporter::report_init). Times are whole
/// nanoseconds and the `%err` columns have two decimals. Cells of a measurement kind without
/// samples are left empty, so a benchmark without results still gets a row with its name,
/// description and iteration count.
///
/// Values are written as they are, without quoting, so names and descriptions must not contain
/// the separator.
///
/// # Examples
///
/// ```
/// use benchmarked::{CsvReporter, Reporter};
///
/// # fn main() -> Result<(), benchmarked::Error> {
/// let mut output: Vec<u8> = Vec::new();
///
/// CsvReporter::new(&mut output)
///     .with_separator(";")
///     .report_init("demo")?;
///
/// assert!(String::from_utf8(output).unwrap().starts_with("name;description;iterations;"));
/// # Ok(())
/// # }
/// ```
#[derive(derive_more::Debug)]
pub struct CsvReporter<W> {
    #[debug(ignore)]
    writer: W,
    separator: String,
}

impl<W> CsvReporter<W>
where
    W: Write,
{
    /// Creates a reporter that writes comma-separated values to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            separator: ",".to_owned(),
        }
    }

    /// Replaces the separator placed between cells.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

fn summary_cells(summary: Option<&Summary>) -> [String; 5] {
    summary.map_or_else(<[String; 5]>::default, |summary| {
        [
            summary.min().as_nanos().to_string(),
            summary.max().as_nanos().to_string(),
            summary.mean().as_nanos().to_string(),
            summary.median().as_nanos().to_string(),
            format!("{:.2}", summary.mad_percent()),
        ]
    })
}

impl<W> Reporter for CsvReporter<W>
where
    W: Write,
{
    fn report_init(&mut self, _launcher_name: &str) -> Result<()> {
        writeln!(self.writer, "{}", CSV_COLUMNS.join(&self.separator))?;
        self.writer.flush()?;

        Ok(())
    }

    fn report_benchmark(&mut self, benchmark: &Benchmark) -> Result<()> {
        let measurements = Measurements::of(benchmark.results())?;

        let mut cells = vec![
            benchmark.name().to_owned(),
            benchmark.description().to_owned(),
            benchmark.iterations().to_string(),
        ];
        cells.extend(summary_cells(measurements.cpu.as_ref()));
        cells.extend(summary_cells(measurements.wall.as_ref()));

        writeln!(self.writer, "{}", cells.join(&self.separator))?;
        self.writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::pal::{FakePlatform, PlatformFacade};
    use crate::SystemProfile;

    /// A launched benchmark whose iterations take 1ms, 2ms, 3ms and so on, on every clock.
    fn ramp_benchmark(name: &str, iterations: u64) -> Benchmark {
        let fake = FakePlatform::new();
        let clock = fake.clone();
        let mut step = Duration::ZERO;

        let mut benchmark = Benchmark::builder(name)
            .description("ramp")
            .iterations(iterations)
            .platform(PlatformFacade::fake(fake))
            .run(move |_| {
                step = step.saturating_add(Duration::from_millis(1));
                clock.advance(step);
            });

        benchmark.launch().unwrap();
        benchmark
    }

    /// A launched benchmark that only advances the wall clock, by 5ms per iteration.
    fn wall_only_benchmark(iterations: u64) -> Benchmark {
        let fake = FakePlatform::new();
        let clock = fake.clone();
        let mut now = Duration::ZERO;

        let mut benchmark = Benchmark::builder("sleepy")
            .description("waits")
            .iterations(iterations)
            .platform(PlatformFacade::fake(fake))
            .run(move |_| {
                now = now.saturating_add(Duration::from_millis(5));
                clock.set_wall_time(now);
            });

        benchmark.launch().unwrap();
        benchmark
    }

    fn csv_output(benchmarks: &[Benchmark]) -> String {
        let mut output: Vec<u8> = Vec::new();
        let mut reporter = CsvReporter::new(&mut output);

        reporter.report_init("test").unwrap();
        for benchmark in benchmarks {
            reporter.report_benchmark(benchmark).unwrap();
        }

        String::from_utf8(output).unwrap()
    }

    fn console_output(benchmark: &Benchmark) -> String {
        let mut output: Vec<u8> = Vec::new();
        let profile = SystemProfile::default()
            .with_cpu_model("Test CPU")
            .with_cores(8, 4)
            .with_clock_mhz(3000, 4500)
            .with_total_ram_bytes(16 * 1024 * 1024 * 1024);

        let mut reporter = ConsoleReporter::new(&mut output, profile);
        reporter.report_init("suite").unwrap();
        reporter.report_benchmark(benchmark).unwrap();
        drop(reporter);

        String::from_utf8(output).unwrap()
    }

    #[test]
    fn csv_header_is_fixed() {
        assert_eq!(
            csv_output(&[]),
            "name,description,iterations,cpu-min[ns],cpu-max[ns],cpu-mean[ns],cpu-median[ns],\
             cpu-%err,wall-min[ns],wall-max[ns],wall-mean[ns],wall-median[ns],wall-%err\n"
        );
    }

    #[test]
    fn csv_row_has_statistics_in_nanoseconds() {
        let output = csv_output(&[ramp_benchmark("ramp", 3)]);
        let row = output.lines().nth(1).unwrap();

        // 1ms, 2ms, 3ms: deviations from the 2ms median are 50%, 0% and 50%.
        assert_eq!(
            row,
            "ramp,ramp,3,1000000,3000000,2000000,2000000,50.00,\
             1000000,3000000,2000000,2000000,50.00"
        );
    }

    #[test]
    fn csv_single_iteration_repeats_the_sample() {
        let output = csv_output(&[ramp_benchmark("once", 1)]);
        let row = output.lines().nth(1).unwrap();

        assert_eq!(
            row,
            "once,ramp,1,1000000,1000000,1000000,1000000,0.00,\
             1000000,1000000,1000000,1000000,0.00"
        );
    }

    #[test]
    fn csv_leaves_missing_kind_empty() {
        let output = csv_output(&[wall_only_benchmark(2)]);
        let row = output.lines().nth(1).unwrap();

        assert_eq!(
            row,
            "sleepy,waits,2,,,,,,5000000,5000000,5000000,5000000,0.00"
        );
    }

    #[test]
    fn csv_row_without_results_has_empty_cells() {
        let benchmark = Benchmark::builder("idle").iterations(2).run(|_| {});
        let output = csv_output(&[benchmark]);
        let row = output.lines().nth(1).unwrap();

        assert_eq!(row, "idle,,2,,,,,,,,,,");
    }

    #[test]
    fn csv_separator_is_configurable() {
        let mut output: Vec<u8> = Vec::new();
        let mut reporter = CsvReporter::new(&mut output).with_separator("\t");

        reporter.report_benchmark(&ramp_benchmark("tabs", 1)).unwrap();
        drop(reporter);

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("tabs\tramp\t1\t1000000\t"), "{text}");
    }

    #[test]
    fn console_header_describes_hardware() {
        let output = console_output(&ramp_benchmark("ramp", 3));

        assert!(output.contains("Benchmark report: suite"), "{output}");
        assert!(output.contains("CPU model:       Test CPU"), "{output}");
        assert!(output.contains("CPU cores:       8 (4)"), "{output}");
        assert!(output.contains("CPU clock speed: 3000 (4500) MHz"), "{output}");
        assert!(output.contains("RAM size:        16.00 GiB"), "{output}");
    }

    #[test]
    fn console_unknown_hardware_is_marked() {
        let mut output: Vec<u8> = Vec::new();
        ConsoleReporter::new(&mut output, SystemProfile::default())
            .report_init("suite")
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("CPU model:       unknown"), "{text}");
        assert!(text.contains("RAM size:        unknown GiB"), "{text}");
    }

    #[test]
    fn console_shows_statistics_for_multiple_iterations() {
        let output = console_output(&ramp_benchmark("ramp", 3));

        assert!(output.contains("Benchmark:       ramp"), "{output}");
        assert!(output.contains("Iterations:      3"), "{output}");
        assert!(output.contains("--- CPU time ---"), "{output}");
        assert!(output.contains("--- Wall time ---"), "{output}");
        assert!(output.contains("min:           1.000000ms"), "{output}");
        assert!(output.contains("max:           3.000000ms"), "{output}");
        assert!(output.contains("median:        2.000000ms"), "{output}");
        assert!(output.contains("% err:         50.00"), "{output}");
    }

    #[test]
    fn console_shows_single_time_for_one_iteration() {
        let output = console_output(&ramp_benchmark("once", 1));

        assert!(output.contains("cpu time:      1.000000ms"), "{output}");
        assert!(output.contains("wall time:     1.000000ms"), "{output}");
        assert!(!output.contains("median"), "{output}");
    }

    #[test]
    fn console_skips_kind_without_samples() {
        let output = console_output(&wall_only_benchmark(2));

        assert!(!output.contains("CPU time"), "{output}");
        assert!(output.contains("--- Wall time ---"), "{output}");
    }

    #[test]
    fn console_notes_missing_results() {
        let benchmark = Benchmark::builder("idle").run(|_| {});
        let output = console_output(&benchmark);

        assert!(output.contains("No results collected."), "{output}");
    }
}
