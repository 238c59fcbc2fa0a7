//! Platform abstraction layer for the clocks behind every measurement.
//!
//! Real clocks come from the operating system (via the `cpu_time` package for processor time).
//! Tests substitute a fake platform whose clock values they set explicitly, which makes it
//! possible to verify aggregation with exact synthetic timestamps.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
mod real;

pub(crate) use abstractions::Platform;
pub(crate) use facade::PlatformFacade;
#[cfg(test)]
pub(crate) use fake::FakePlatform;
