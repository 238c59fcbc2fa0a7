/// Setup and teardown hooks wrapped around a benchmark routine.
///
/// All hooks run outside of the measured region. A benchmark calls them in this order:
///
/// 1. [`set_up()`](Self::set_up) once, before the first iteration.
/// 2. For every iteration: [`initialize()`](Self::initialize), then the measured routine,
///    then [`reset()`](Self::reset).
/// 3. [`clean_up()`](Self::clean_up) once, after the last iteration.
///
/// Every hook has an empty default implementation, so a fixture only implements the hooks it
/// needs. The routine receives the fixture by mutable reference, which makes the fixture the
/// natural home for any state the routine works on.
///
/// # Examples
///
/// ```
/// use benchmarked::{Benchmark, Fixture};
///
/// struct Haystack {
///     text: String,
///     needle: &'static str,
/// }
///
/// impl Fixture for Haystack {
///     fn set_up(&mut self) {
///         self.text = "lorem ipsum ".repeat(1000) + "keyword";
///     }
/// }
///
/// let benchmark = Benchmark::builder("search for keyword")
///     .kind("example")
///     .iterations(5)
///     .fixture(Haystack {
///         text: String::new(),
///         needle: "keyword",
///     })
///     .run(|haystack| {
///         std::hint::black_box(haystack.text.find(haystack.needle));
///     });
/// ```
pub trait Fixture {
    /// Called once before the first iteration.
    fn set_up(&mut self) {}

    /// Called before every iteration, before measurement starts.
    fn initialize(&mut self) {}

    /// Called after every iteration, after measurement stops.
    fn reset(&mut self) {}

    /// Called once after the last iteration.
    fn clean_up(&mut self) {}
}

/// The empty fixture, for benchmarks that need no setup or state.
impl Fixture for () {}
