use std::num::NonZero;
use std::thread;

/// Describes the hardware that benchmarks run on, for report headers.
///
/// Every value is optional because not every platform exposes every property. Reporters print
/// unknown values as such instead of failing.
pub trait SystemInfo {
    /// Marketing name of the processor model.
    fn cpu_model(&self) -> Option<String>;

    /// Number of logical processors available to the process.
    fn logical_cores(&self) -> Option<usize>;

    /// Number of physical processor cores.
    fn physical_cores(&self) -> Option<usize>;

    /// Base clock speed of the processor, in megahertz.
    fn regular_clock_mhz(&self) -> Option<u64>;

    /// Maximum boost clock speed of the processor, in megahertz.
    fn max_clock_mhz(&self) -> Option<u64>;

    /// Total installed memory, in bytes.
    fn total_ram_bytes(&self) -> Option<u64>;
}

/// A snapshot of hardware properties.
///
/// Use [`detect()`](Self::detect) for the properties of the current machine, or fill in the
/// fields with the builder methods when the values come from elsewhere.
///
/// # Examples
///
/// ```
/// use benchmarked::{SystemInfo, SystemProfile};
///
/// let profile = SystemProfile::default()
///     .with_cpu_model("Example CPU")
///     .with_total_ram_bytes(16 * 1024 * 1024 * 1024);
///
/// assert_eq!(profile.cpu_model().as_deref(), Some("Example CPU"));
/// assert_eq!(profile.logical_cores(), None);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[must_use]
pub struct SystemProfile {
    cpu_model: Option<String>,
    logical_cores: Option<usize>,
    physical_cores: Option<usize>,
    regular_clock_mhz: Option<u64>,
    max_clock_mhz: Option<u64>,
    total_ram_bytes: Option<u64>,
}

impl SystemProfile {
    /// Detects the properties of the current machine that the standard library exposes.
    ///
    /// Only the logical core count is currently detected; everything else is unknown.
    pub fn detect() -> Self {
        Self {
            logical_cores: thread::available_parallelism().ok().map(NonZero::get),
            ..Self::default()
        }
    }

    /// Sets the processor model name.
    pub fn with_cpu_model(mut self, model: impl Into<String>) -> Self {
        self.cpu_model = Some(model.into());
        self
    }

    /// Sets the logical and physical core counts.
    pub fn with_cores(mut self, logical: usize, physical: usize) -> Self {
        self.logical_cores = Some(logical);
        self.physical_cores = Some(physical);
        self
    }

    /// Sets the base and maximum clock speeds, in megahertz.
    pub fn with_clock_mhz(mut self, regular: u64, max: u64) -> Self {
        self.regular_clock_mhz = Some(regular);
        self.max_clock_mhz = Some(max);
        self
    }

    /// Sets the total installed memory, in bytes.
    pub fn with_total_ram_bytes(mut self, bytes: u64) -> Self {
        self.total_ram_bytes = Some(bytes);
        self
    }
}

impl SystemInfo for SystemProfile {
    fn cpu_model(&self) -> Option<String> {
        self.cpu_model.clone()
    }

    fn logical_cores(&self) -> Option<usize> {
        self.logical_cores
    }

    fn physical_cores(&self) -> Option<usize> {
        self.physical_cores
    }

    fn regular_clock_mhz(&self) -> Option<u64> {
        self.regular_clock_mhz
    }

    fn max_clock_mhz(&self) -> Option<u64> {
        self.max_clock_mhz
    }

    fn total_ram_bytes(&self) -> Option<u64> {
        self.total_ram_bytes
    }
}
