//! A benchmark binary with a command line, the way a project would wire up its own suite.
//!
//! Benchmarks are registered by an explicit `register()` function, then selected, launched and
//! reported as directed by the command line arguments.
//!
//! Run with: `cargo run --example benchmarked_cli -- --format csv --name "sort_.*"`.
//!
//! Set `RUST_LOG=benchmarked=debug` to see what the launcher does.

use std::collections::{BTreeMap, HashMap};
use std::hint::black_box;
use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;
use benchmarked::{
    Benchmark, ClockKind, ConsoleLauncher, Fixture, LaunchOptions, Launcher, OutputFormat,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Launches the demo benchmark suite.
#[derive(FromArgs)]
struct Args {
    /// full-match regular expression that selects benchmarks by name
    #[argh(option, default = "String::new()")]
    name: String,

    /// selects benchmarks of exactly this type
    #[argh(option, default = "String::new()")]
    kind: String,

    /// only list the selected benchmarks
    #[argh(switch)]
    list: bool,

    /// report format, "console" or "csv"
    #[argh(option, default = "OutputFormat::Console")]
    format: OutputFormat,

    /// write the report to this file instead of standard output
    #[argh(option)]
    output: Option<PathBuf>,
}

/// Holds the data that is sorted in place by every iteration.
struct SortFixture {
    data: Vec<usize>,
}

impl Fixture for SortFixture {}

/// Fills a map before every iteration so that only the lookups are measured.
struct LookupFixture<M> {
    map: M,
    size: u64,
}

impl Fixture for LookupFixture<HashMap<u64, u64>> {
    fn initialize(&mut self) {
        self.map = (0..self.size).map(|key| (key, key)).collect();
    }

    fn reset(&mut self) {
        self.map.clear();
    }
}

impl Fixture for LookupFixture<BTreeMap<u64, u64>> {
    fn initialize(&mut self) {
        self.map = (0..self.size).map(|key| (key, key)).collect();
    }

    fn reset(&mut self) {
        self.map.clear();
    }
}

fn register(launcher: &mut Launcher) {
    for size in [100_usize, 10_000] {
        launcher.register_builder(move || {
            Benchmark::builder(format!("sort_{size}"))
                .kind("sort")
                .description(format!("sort {size} descending integers"))
                .iterations(10)
                .fixture(SortFixture { data: Vec::new() })
                .clean_up(move |fixture| fixture.data = (0..size).rev().collect())
                .run(|fixture| {
                    fixture.data.sort_unstable();
                    black_box(&fixture.data);
                })
        });
    }

    launcher.register_builder(|| {
        Benchmark::builder("lookup_hash")
            .kind("lookup")
            .description("look up every key of a HashMap")
            .iterations(10)
            .fixture(LookupFixture {
                map: HashMap::new(),
                size: 10_000,
            })
            .run(|fixture| {
                for key in 0..fixture.size {
                    black_box(fixture.map.get(&key));
                }
            })
    });

    launcher.register_builder(|| {
        Benchmark::builder("lookup_btree")
            .kind("lookup")
            .description("look up every key of a BTreeMap")
            .iterations(10)
            .fixture(LookupFixture {
                map: BTreeMap::new(),
                size: 10_000,
            })
            .run(|fixture| {
                for key in 0..fixture.size {
                    black_box(fixture.map.get(&key));
                }
            })
    });

    launcher.register_builder(|| {
        Benchmark::builder("sum_threads")
            .kind("parallel")
            .description("sum on four threads, measured as total processor time")
            .iterations(5)
            .cpu_clock(ClockKind::TotalCpu)
            .run(|_| {
                std::thread::scope(|s| {
                    for _ in 0..4 {
                        s.spawn(|| black_box((0..1_000_000_u64).fold(0_u64, u64::wrapping_add)));
                    }
                });
            })
    });
}

fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let args: Args = argh::from_env();

    let mut options = LaunchOptions::default()
        .with_name_filter(args.name)
        .with_type_filter(args.kind)
        .with_list_only(args.list)
        .with_format(args.format);

    if let Some(output) = args.output {
        options = options.with_output(output);
    }

    let mut launcher = Launcher::new("benchmarked demo");
    register(&mut launcher);

    match ConsoleLauncher::new(launcher, options).execute() {
        Ok(Some(summary)) if !summary.failures().is_empty() => {
            for failure in summary.failures() {
                eprintln!("{failure}");
            }

            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
