//! facts about the host that are fixed for the lifetime of the process.

use {
    std::{io, num::NonZeroUsize},
    thiserror::Error,
};

/// the number of logical cores being monitored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CoreCount(NonZeroUsize);

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to determine the number of cpu cores")]
    Unknown(#[source] io::Error),
    #[error("the host reported {0} cpu cores")]
    NonPositive(i64),
}

// === impl CoreCount ===

impl CoreCount {
    pub fn new(cores: usize) -> Option<Self> {
        NonZeroUsize::new(cores).map(Self)
    }

    pub fn get(self) -> usize {
        let Self(cores) = self;
        cores.get()
    }

    /// the number of slots needed to hold every core, plus the aggregate.
    pub fn slots(self) -> usize {
        self.get() + 1
    }
}

/// returns the number of cores currently online.
#[cfg(unix)]
pub fn online_cores() -> Result<CoreCount, DiscoveryError> {
    // SAFETY: `sysconf` has no preconditions.
    let cores = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };

    if cores < 0 {
        return Err(DiscoveryError::Unknown(io::Error::last_os_error()));
    }

    usize::try_from(cores)
        .ok()
        .and_then(CoreCount::new)
        .ok_or(DiscoveryError::NonPositive(cores.into()))
}

/// returns the number of cores currently online.
#[cfg(not(unix))]
pub fn online_cores() -> Result<CoreCount, DiscoveryError> {
    std::thread::available_parallelism()
        .map(CoreCount)
        .map_err(DiscoveryError::Unknown)
}
