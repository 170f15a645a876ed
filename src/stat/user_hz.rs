use std::str::FromStr;

/// a cumulative counter of clock ticks.
///
/// counters are read as unsigned 64-bit values. arithmetic on them is done in `i128`, so that
/// sums of several counters cannot overflow and deltas between two readings may be negative.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct UserHz(u64);

// === impl UserHz ===

impl UserHz {
    /// returns the number of ticks, widened for signed arithmetic.
    pub fn ticks(self) -> i128 {
        let Self(hz) = self;
        hz.into()
    }
}

impl From<u64> for UserHz {
    fn from(hz: u64) -> Self {
        Self(hz)
    }
}

impl FromStr for UserHz {
    type Err = <u64 as FromStr>::Err;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}
