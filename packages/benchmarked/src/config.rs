use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::{
    ConsoleReporter, CsvReporter, Error, Filter, LaunchSummary, Launcher, Result, SystemProfile,
};

/// The text format of a report.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum OutputFormat {
    /// Human-readable blocks.
    #[default]
    Console,

    /// Comma-separated values with a header row.
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Console => "console",
            Self::Csv => "csv",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("console") {
            Ok(Self::Console)
        } else if s.eq_ignore_ascii_case("csv") {
            Ok(Self::Csv)
        } else {
            Err(Error::UnknownOutputFormat {
                value: s.to_owned(),
            })
        }
    }
}

/// Controls what a [`ConsoleLauncher`] does.
///
/// The defaults launch every benchmark and write a console report to standard output.
///
/// # Examples
///
/// ```
/// use benchmarked::{LaunchOptions, OutputFormat};
///
/// let options = LaunchOptions::default()
///     .with_name_filter("sort_.*")
///     .with_format(OutputFormat::Csv);
///
/// assert_eq!(options.name_filter(), "sort_.*");
/// assert!(!options.list_only());
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[must_use]
pub struct LaunchOptions {
    name_filter: String,
    type_filter: String,
    list_only: bool,
    format: OutputFormat,
    output: Option<PathBuf>,
}

impl LaunchOptions {
    /// Sets the pattern that benchmark names must fully match. Empty matches every name.
    pub fn with_name_filter(mut self, pattern: impl Into<String>) -> Self {
        self.name_filter = pattern.into();
        self
    }

    /// Sets the benchmark type to select. Empty matches every type.
    pub fn with_type_filter(mut self, kind: impl Into<String>) -> Self {
        self.type_filter = kind.into();
        self
    }

    /// Only lists the selected benchmarks instead of launching them.
    pub fn with_list_only(mut self, list_only: bool) -> Self {
        self.list_only = list_only;
        self
    }

    /// Sets the report format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Writes the output to a file instead of standard output. The file is replaced.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// The pattern that benchmark names must fully match.
    #[must_use]
    pub fn name_filter(&self) -> &str {
        &self.name_filter
    }

    /// The benchmark type to select.
    #[must_use]
    pub fn type_filter(&self) -> &str {
        &self.type_filter
    }

    /// Whether benchmarks are only listed.
    #[must_use]
    pub fn list_only(&self) -> bool {
        self.list_only
    }

    /// The report format.
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// The output file, if any.
    #[must_use]
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Compiles the name and type filters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] if the name filter is not a valid regular expression.
    pub fn filter(&self) -> Result<Filter> {
        Filter::new(&self.name_filter, &self.type_filter)
    }
}

/// Runs a [`Launcher`] as directed by [`LaunchOptions`], as the entry point of a benchmark
/// binary would.
///
/// # Examples
///
/// ```
/// use benchmarked::{Benchmark, ConsoleLauncher, LaunchOptions, Launcher, OutputFormat};
///
/// # fn main() -> Result<(), benchmarked::Error> {
/// let mut launcher = Launcher::new("demo");
/// launcher.register_builder(|| Benchmark::builder("noop").run(|_| {}));
///
/// let options = LaunchOptions::default().with_format(OutputFormat::Csv);
///
/// let mut output: Vec<u8> = Vec::new();
/// ConsoleLauncher::new(launcher, options).execute_to(&mut output)?;
///
/// assert!(String::from_utf8(output).unwrap().contains("noop,"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConsoleLauncher {
    launcher: Launcher,
    options: LaunchOptions,
}

impl ConsoleLauncher {
    /// Couples a launcher with the options that drive it.
    #[must_use]
    pub fn new(launcher: Launcher, options: LaunchOptions) -> Self {
        Self { launcher, options }
    }

    /// The wrapped launcher.
    #[must_use]
    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    /// The options that drive the launcher.
    #[must_use]
    pub fn options(&self) -> &LaunchOptions {
        &self.options
    }

    /// Lists or launches the selected benchmarks and writes the result to the configured
    /// output.
    ///
    /// Returns the launch summary, or `None` in list mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the name filter is invalid or the output cannot be written.
    #[cfg_attr(test, mutants::skip)] // Writes to stdout unless an output file is configured.
    pub fn execute(&mut self) -> Result<Option<LaunchSummary>> {
        let Some(path) = self.options.output.clone() else {
            return self.execute_to(&mut io::stdout().lock());
        };

        debug!(path = %path.display(), "writing benchmark output to file");

        let mut writer = BufWriter::new(File::create(&path)?);
        let summary = self.execute_to(&mut writer)?;
        writer.flush()?;

        Ok(summary)
    }

    /// Like [`execute()`](Self::execute) but ignores the configured output file and writes to
    /// `writer` instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the name filter is invalid or `writer` fails.
    pub fn execute_to(&mut self, writer: &mut dyn Write) -> Result<Option<LaunchSummary>> {
        let filter = self.options.filter()?;

        if self.options.list_only {
            for benchmark in self.launcher.list(&filter) {
                writeln!(writer, "{}\t{}", benchmark.name(), benchmark.kind())?;
            }

            return Ok(None);
        }

        let summary = self.launcher.launch(&filter);

        match self.options.format {
            OutputFormat::Console => self.launcher.report(&mut ConsoleReporter::new(
                &mut *writer,
                SystemProfile::detect(),
            ))?,
            OutputFormat::Csv => self.launcher.report(&mut CsvReporter::new(&mut *writer))?,
        }

        Ok(Some(summary))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fs;

    use super::*;
    use crate::Benchmark;

    fn launcher() -> Launcher {
        let mut launcher = Launcher::new("config");

        launcher.register_builder(|| Benchmark::builder("fast").kind("quick").run(|_| {}));
        launcher.register_builder(|| Benchmark::builder("slow").kind("thorough").run(|_| {}));

        launcher
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!("console".parse::<OutputFormat>().unwrap(), OutputFormat::Console);
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!(matches!(
            "json".parse::<OutputFormat>(),
            Err(Error::UnknownOutputFormat { ref value }) if value == "json"
        ));
    }

    #[test]
    fn output_format_display_parses_back() {
        for format in [OutputFormat::Console, OutputFormat::Csv] {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), format);
        }
    }

    #[test]
    fn defaults_select_everything() {
        let options = LaunchOptions::default();

        assert_eq!(options.format(), OutputFormat::Console);
        assert_eq!(options.output(), None);
        assert!(options.filter().unwrap().matches("anything", "at all"));
    }

    #[test]
    fn list_only_names_matching_benchmarks() {
        let options = LaunchOptions::default()
            .with_type_filter("quick")
            .with_list_only(true);
        let mut console = ConsoleLauncher::new(launcher(), options);

        let mut output: Vec<u8> = Vec::new();
        let summary = console.execute_to(&mut output).unwrap();

        assert!(summary.is_none());
        assert_eq!(String::from_utf8(output).unwrap(), "fast\tquick\n");
        assert!(console.launcher().benchmarks().iter().all(|b| !b.is_launched()));
    }

    #[test]
    fn csv_report_has_row_per_launched_benchmark() {
        let options = LaunchOptions::default()
            .with_name_filter("slow")
            .with_format(OutputFormat::Csv);
        let mut console = ConsoleLauncher::new(launcher(), options);

        let mut output: Vec<u8> = Vec::new();
        let summary = console.execute_to(&mut output).unwrap().unwrap();

        assert_eq!(summary.launched(), ["slow"]);

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.first().unwrap().starts_with("name,description,iterations,"));
        assert!(lines.get(1).unwrap().starts_with("slow,"));
    }

    #[test]
    fn console_report_is_written() {
        let mut console = ConsoleLauncher::new(launcher(), LaunchOptions::default());

        let mut output: Vec<u8> = Vec::new();
        console.execute_to(&mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Benchmark report: config"), "{text}");
        assert!(text.contains("Benchmark:       fast"), "{text}");
        assert!(text.contains("Benchmark:       slow"), "{text}");
    }

    #[test]
    fn invalid_name_filter_is_reported() {
        let options = LaunchOptions::default().with_name_filter("(");
        let mut console = ConsoleLauncher::new(launcher(), options);

        assert!(matches!(
            console.execute_to(&mut Vec::<u8>::new()),
            Err(Error::InvalidFilter { .. })
        ));
    }

    #[test]
    fn execute_writes_to_output_file() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("report.csv");

        let options = LaunchOptions::default()
            .with_format(OutputFormat::Csv)
            .with_output(&path);
        let mut console = ConsoleLauncher::new(launcher(), options);

        let summary = console.execute().unwrap().unwrap();
        assert_eq!(summary.launched(), ["fast", "slow"]);

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 3);
    }
}
