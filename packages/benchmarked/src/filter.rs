use regex::Regex;

use crate::{Benchmark, Error, Result};

/// Selects benchmarks by name and type.
///
/// The name pattern is a regular expression that must match the whole name, not just a part of
/// it. The type must be equal to the benchmark type. An empty pattern or type matches
/// everything.
///
/// # Examples
///
/// ```
/// use benchmarked::Filter;
///
/// # fn main() -> Result<(), benchmarked::Error> {
/// let filter = Filter::new("sort_.*", "")?;
///
/// assert!(filter.matches("sort_small", "example"));
/// assert!(!filter.matches("quicksort_small", "example"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Filter {
    name: Option<Regex>,
    kind: Option<String>,
}

impl Filter {
    /// Creates a filter from a name pattern and a benchmark type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] if the name pattern is not a valid regular expression.
    pub fn new(name_pattern: &str, kind: &str) -> Result<Self> {
        let name = if name_pattern.is_empty() {
            None
        } else {
            Some(
                Regex::new(&format!("^(?:{name_pattern})$")).map_err(|source| {
                    Error::InvalidFilter {
                        pattern: name_pattern.to_owned(),
                        source,
                    }
                })?,
            )
        };

        let kind = (!kind.is_empty()).then(|| kind.to_owned());

        Ok(Self { name, kind })
    }

    /// A filter that matches every benchmark.
    #[must_use]
    pub fn all() -> Self {
        Self {
            name: None,
            kind: None,
        }
    }

    /// Whether a benchmark with the given name and type is selected.
    #[must_use]
    pub fn matches(&self, name: &str, kind: &str) -> bool {
        self.name.as_ref().is_none_or(|pattern| pattern.is_match(name))
            && self.kind.as_deref().is_none_or(|expected| expected == kind)
    }

    pub(crate) fn selects(&self, benchmark: &Benchmark) -> bool {
        self.matches(benchmark.name(), benchmark.kind())
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::all()
    }
}
