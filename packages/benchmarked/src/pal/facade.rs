//! Dispatch between the real and fake clock sources.

use std::time::Duration;

use crate::pal::abstractions::Platform;
#[cfg(test)]
use crate::pal::fake::FakePlatform;
use crate::pal::real::RealPlatform;

/// Switches between the real and the fake platform implementations.
#[derive(Clone, Debug)]
pub(crate) enum PlatformFacade {
    Real(RealPlatform),

    #[cfg(test)]
    Fake(FakePlatform),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(RealPlatform::new())
    }

    #[cfg(test)]
    pub(crate) fn fake(fake_platform: FakePlatform) -> Self {
        Self::Fake(fake_platform)
    }
}

impl Platform for PlatformFacade {
    fn wall_time(&self) -> Duration {
        match self {
            Self::Real(platform) => platform.wall_time(),
            #[cfg(test)]
            Self::Fake(platform) => platform.wall_time(),
        }
    }

    fn thread_time(&self) -> Duration {
        match self {
            Self::Real(platform) => platform.thread_time(),
            #[cfg(test)]
            Self::Fake(platform) => platform.thread_time(),
        }
    }

    fn process_time(&self) -> Duration {
        match self {
            Self::Real(platform) => platform.process_time(),
            #[cfg(test)]
            Self::Fake(platform) => platform.process_time(),
        }
    }
}
