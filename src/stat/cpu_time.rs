use super::*;

/// how a cpu has spent its time since boot.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CpuTime {
    /// time spent in user mode.
    pub user: UserHz,
    /// time spent in user mode with low priority (nice).
    pub nice: UserHz,
    /// time spent in system mode.
    pub system: UserHz,
    /// time spent in the idle task.
    ///
    /// this value should be USER_HZ times the second entry in the /proc/uptime pseudo-file.
    pub idle: UserHz,
    /// time waiting for i/o to complete.
    ///
    /// this value is not reliable, for the following reasons:
    ///   *  the cpu will not wait for i/o to complete; iowait is the time that a task is waiting
    ///      for i/o to complete. when a cpu goes into idle state for outstanding task i/o,
    ///      another task will be scheduled on this cpu.
    ///   *  on a multi-core cpu, the task waiting for i/o to complete is not running on any cpu,
    ///      so the iowait of each cpu is difficult to calculate.
    ///   *  the value in this field may decrease in certain conditions.
    pub iowait: UserHz,
    /// time servicing interrupts.
    pub irq: UserHz,
    /// time servicing softirqs.
    pub softirq: UserHz,
    /// stolen time, which is the time spent in other operating systems when running in a
    /// virtualized environment.
    pub steal: UserHz,
}

/// a measurement of the difference between two [`CpuTime`]s.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Measurement {
    /// change in idle time.
    idle: i128,
    /// change in total time.
    total: i128,
}

// === impl CpuTime ===

impl CpuTime {
    /// the number of counters read from a cpu line.
    pub const FIELDS: usize = 8;

    /// the number of trailing fields that may follow the counters.
    ///
    /// `guest` and `guest_nice` are already accounted for in `user` and `nice`.
    const IGNORED: usize = 2;

    /// idle time, less time spent waiting on i/o.
    pub fn idle(&self) -> i128 {
        let Self { idle, iowait, .. } = *self;
        idle.ticks() - iowait.ticks()
    }

    /// time spent doing anything other than idling.
    pub fn non_idle(&self) -> i128 {
        let Self {
            user,
            nice,
            system,
            irq,
            softirq,
            steal,
            idle: _,
            iowait: _,
        } = *self;

        [user, nice, system, irq, softirq, steal]
            .into_iter()
            .map(UserHz::ticks)
            .sum()
    }

    pub fn total(&self) -> i128 {
        self.idle() + self.non_idle()
    }
}

impl TryFrom<Vec<UserHz>> for CpuTime {
    type Error = EntryParseError;
    fn try_from(mut times: Vec<UserHz>) -> Result<Self, Self::Error> {
        let found = times.len();
        if !(Self::FIELDS..=Self::FIELDS + Self::IGNORED).contains(&found) {
            return Err(EntryParseError::CpuTime { found });
        }

        times.truncate(Self::FIELDS);
        <[UserHz; 8]>::try_from(times)
            .map(Self::from)
            .map_err(|_| EntryParseError::CpuTime { found })
    }
}

impl From<[UserHz; 8]> for CpuTime {
    fn from([user, nice, system, idle, iowait, irq, softirq, steal]: [UserHz; 8]) -> Self {
        Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
        }
    }
}

impl From<[u64; 8]> for CpuTime {
    fn from(times: [u64; 8]) -> Self {
        times.map(UserHz::from).into()
    }
}

// === impl Measurement ===

impl Measurement {
    pub fn new(previous: &CpuTime, current: &CpuTime) -> Self {
        Self {
            idle: current.idle() - previous.idle(),
            total: current.total() - previous.total(),
        }
    }

    /// returns the percentage of time the cpu was busy, in `[0, 100]`.
    ///
    /// returns `None` when the total did not advance, in which case there is no meaningful
    /// percentage to report.
    pub fn percentage(&self) -> Option<f64> {
        let Self { idle, total } = *self;

        if total <= 0 {
            return None;
        }

        let busy = (total - idle) as f64;
        let percent = busy / total as f64 * 100.0;

        Some(percent.clamp(0.0, 100.0))
    }
}
