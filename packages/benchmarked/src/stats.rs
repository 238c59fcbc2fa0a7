//! Summary statistics over measurement samples.
//!
//! Every function requires a non-empty sample set and returns [`Error::EmptySamples`]
//! otherwise.

use std::time::Duration;

use crate::{Error, Result};

/// Smallest sample.
///
/// # Errors
///
/// Returns [`Error::EmptySamples`] if `samples` is empty.
pub fn min(samples: &[f64]) -> Result<f64> {
    samples
        .iter()
        .copied()
        .min_by(f64::total_cmp)
        .ok_or(Error::EmptySamples)
}

/// Largest sample.
///
/// # Errors
///
/// Returns [`Error::EmptySamples`] if `samples` is empty.
pub fn max(samples: &[f64]) -> Result<f64> {
    samples
        .iter()
        .copied()
        .max_by(f64::total_cmp)
        .ok_or(Error::EmptySamples)
}

/// Arithmetic mean of the samples.
///
/// # Errors
///
/// Returns [`Error::EmptySamples`] if `samples` is empty.
#[expect(
    clippy::cast_precision_loss,
    reason = "sample counts far below 2^52 are exact in f64"
)]
pub fn mean(samples: &[f64]) -> Result<f64> {
    if samples.is_empty() {
        return Err(Error::EmptySamples);
    }

    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Middle sample after sorting, or the mean of the two middle samples for an even count.
///
/// # Errors
///
/// Returns [`Error::EmptySamples`] if `samples` is empty.
#[expect(clippy::integer_division, reason = "rounding down selects the upper middle sample")]
pub fn median(samples: &[f64]) -> Result<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let upper_index = sorted.len() / 2;
    let upper = *sorted.get(upper_index).ok_or(Error::EmptySamples)?;

    if sorted.len() % 2 == 1 {
        return Ok(upper);
    }

    let lower = *sorted
        .get(upper_index.wrapping_sub(1))
        .expect("an even non-empty set has at least two samples");

    Ok(lower.midpoint(upper))
}

/// Median of the absolute deviations from the median, as a percentage of the median.
///
/// If the median is zero the relative deviation is undefined. In that case the result is `0.0`
/// when every sample is zero and [`f64::INFINITY`] otherwise.
///
/// # Errors
///
/// Returns [`Error::EmptySamples`] if `samples` is empty.
pub fn median_absolute_percent_error(samples: &[f64]) -> Result<f64> {
    let center = median(samples)?;

    if center == 0.0 {
        return Ok(if samples.iter().all(|sample| *sample == 0.0) {
            0.0
        } else {
            f64::INFINITY
        });
    }

    let deviations: Vec<f64> = samples
        .iter()
        .map(|sample| (sample - center).abs() / center.abs())
        .collect();

    Ok(median(&deviations)? * 100.0)
}

/// Summary statistics over a set of duration samples.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use benchmarked::Summary;
///
/// # fn main() -> Result<(), benchmarked::Error> {
/// let samples = [
///     Duration::from_millis(10),
///     Duration::from_millis(12),
///     Duration::from_millis(11),
/// ];
///
/// let summary = Summary::from_durations(&samples)?;
/// assert_eq!(summary.median(), Duration::from_millis(11));
/// assert_eq!(summary.min(), Duration::from_millis(10));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    min: Duration,
    max: Duration,
    mean: Duration,
    median: Duration,
    mad_percent: f64,
}

impl Summary {
    /// Calculates the summary of a non-empty set of samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySamples`] if `samples` is empty.
    #[expect(clippy::integer_division, reason = "rounding down selects the upper middle sample")]
    pub fn from_durations(samples: &[Duration]) -> Result<Self> {
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        let (Some(min), Some(max)) = (sorted.first().copied(), sorted.last().copied()) else {
            return Err(Error::EmptySamples);
        };

        let total_nanos: u128 = sorted.iter().map(Duration::as_nanos).sum();
        let mean = nanos_to_duration(
            total_nanos
                .checked_div(u128::try_from(sorted.len()).expect("usize always fits in u128"))
                .expect("guarded by the emptiness check above"),
        );

        let upper_index = sorted.len() / 2;
        let upper = *sorted.get(upper_index).expect("index is within a non-empty set");
        let median = if sorted.len() % 2 == 1 {
            upper
        } else {
            let lower = *sorted
                .get(upper_index.wrapping_sub(1))
                .expect("an even non-empty set has at least two samples");

            nanos_to_duration(lower.as_nanos().midpoint(upper.as_nanos()))
        };

        #[expect(
            clippy::cast_precision_loss,
            reason = "nanosecond samples below 2^52 are exact in f64"
        )]
        let as_nanos: Vec<f64> = sorted.iter().map(|sample| sample.as_nanos() as f64).collect();
        let mad_percent = median_absolute_percent_error(&as_nanos)?;

        Ok(Self {
            min,
            max,
            mean,
            median,
            mad_percent,
        })
    }

    /// Smallest sample.
    #[must_use]
    pub fn min(&self) -> Duration {
        self.min
    }

    /// Largest sample.
    #[must_use]
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Arithmetic mean of the samples, truncated to whole nanoseconds.
    #[must_use]
    pub fn mean(&self) -> Duration {
        self.mean
    }

    /// Median of the samples, truncated to whole nanoseconds.
    #[must_use]
    pub fn median(&self) -> Duration {
        self.median
    }

    /// Median absolute deviation from the median, as a percentage of the median.
    #[must_use]
    pub fn mad_percent(&self) -> f64 {
        self.mad_percent
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    Duration::from_nanos(
        nanos
            .try_into()
            .expect("all realistic values fit in u64"),
    )
}
