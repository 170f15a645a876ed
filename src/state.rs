//! the state shared by the sampler, the analyzer, and the reporter.
//!
//! one mutex guards the whole table. the sampler holds it while writing a snapshot, the
//! analyzer while performing one delta pass, and the reporter while copying out the results.
//! nobody holds it while sleeping.

use {
    crate::{
        host::CoreCount,
        stat::{CpuTime, Snapshot},
    },
    std::{
        collections::TryReserveError,
        fmt::{self, Display},
        sync::{Condvar, Mutex, MutexGuard, PoisonError},
    },
    thiserror::Error,
};

/// per-core counters and utilization, shared between workers.
#[derive(Debug)]
pub struct SharedState {
    table: Mutex<Table>,
    /// signalled after each write, and when the state is closed.
    fresh: Condvar,
}

/// the contents of [`SharedState`].
///
/// slot 0 holds the aggregate of all cores. slots `1..=N` hold each core.
#[derive(Debug)]
pub struct Table {
    /// the tick that wrote the current counters.
    generation: Generation,
    /// set once no more snapshots will be written.
    closed: bool,
    cores: Box<[Core]>,
}

/// one slot of the [`Table`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Core {
    /// the latest counters written by the sampler.
    pub counters: CpuTime,
    /// the latest utilization computed by the analyzer.
    pub utilization: Utilization,
}

/// identifies the sampling tick a snapshot belongs to.
///
/// generation 0 means nothing has been written yet.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Generation(u64);

/// a percentage of time a core spent busy, in `[0, 100]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Utilization(f64);

/// a snapshot did not have a row for every core.
#[derive(Debug, Error, Eq, PartialEq)]
#[error("expected {expected} cpu lines, found {found}")]
pub struct MissingCores {
    pub expected: usize,
    pub found: usize,
}

// === impl SharedState ===

impl SharedState {
    /// allocates state for `cores` cores, plus the aggregate.
    pub fn new(cores: CoreCount) -> Result<Self, TryReserveError> {
        let cores = arena(cores.slots(), Core::default())?;
        let table = Table {
            generation: Generation::default(),
            closed: false,
            cores,
        };

        Ok(Self {
            table: Mutex::new(table),
            fresh: Condvar::new(),
        })
    }

    /// writes a snapshot into the table, and then wakes the analyzer.
    ///
    /// every core is written under a single critical section, so readers never observe
    /// counters from two different ticks. rows beyond the table's core count are ignored.
    pub fn publish(&self, snapshot: &Snapshot) -> Result<Generation, MissingCores> {
        let Snapshot { system, cpus } = snapshot;

        let generation = {
            let mut table = self.lock();
            let (aggregate, cores) = table.cores.split_at_mut(1);

            if cpus.len() < cores.len() {
                return Err(MissingCores {
                    expected: cores.len(),
                    found: cpus.len(),
                });
            }

            aggregate[0].counters = *system;
            for (core, counters) in cores.iter_mut().zip(cpus.values()) {
                core.counters = *counters;
            }

            table.generation = table.generation.next();
            table.generation
        };

        self.fresh.notify_all();

        Ok(generation)
    }

    /// blocks until a generation other than `seen` has been published.
    ///
    /// returns the locked table, or `None` once the state is closed and there is nothing left
    /// to consume. spurious or repeated wakeups are absorbed here.
    pub fn wait_fresh(&self, seen: Generation) -> Option<MutexGuard<'_, Table>> {
        let table = self.lock();
        let table = self
            .fresh
            .wait_while(table, |table| table.generation == seen && !table.closed)
            .unwrap_or_else(PoisonError::into_inner);

        (table.generation != seen).then_some(table)
    }

    /// marks that no more snapshots will be published, waking any waiters.
    pub fn close(&self) {
        self.lock().closed = true;
        self.fresh.notify_all();
    }

    /// copies the utilization of cores `1..=N` into `into`.
    pub fn read_utilization(&self, into: &mut Vec<Utilization>) {
        into.clear();
        let table = self.lock();
        into.extend(table.cores[1..].iter().map(|core| core.utilization));
    }

    /// returns the utilization of the given core, where core 1 is the first.
    pub fn utilization(&self, core: usize) -> Option<Utilization> {
        match core {
            0 => None,
            core => self.lock().cores.get(core).map(|core| core.utilization),
        }
    }

    pub fn generation(&self) -> Generation {
        self.lock().generation
    }

    /// the number of cores, not counting the aggregate.
    pub fn cores(&self) -> usize {
        self.lock().cores.len() - 1
    }

    /// locks the table.
    ///
    /// a worker that panicked while holding the lock brings the whole monitor down, so a
    /// poisoned table is still read.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// === impl Table ===

impl Table {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// every slot, starting with the aggregate.
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    pub fn cores_mut(&mut self) -> &mut [Core] {
        &mut self.cores
    }
}

// === impl Generation ===

impl Generation {
    fn next(self) -> Self {
        let Self(generation) = self;
        Self(generation + 1)
    }

    /// how many generations have passed since `earlier`.
    pub fn since(self, earlier: Self) -> u64 {
        let (Self(this), Self(earlier)) = (self, earlier);
        this.saturating_sub(earlier)
    }
}

impl Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(generation) = self;
        write!(f, "#{generation}")
    }
}

// === impl Utilization ===

impl Utilization {
    pub fn new(percent: f64) -> Self {
        Self(percent)
    }

    pub fn percent(self) -> f64 {
        let Self(percent) = self;
        percent
    }
}

impl Display for Utilization {
    /// formats the percentage, honoring any requested precision.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(percent) = self;
        Display::fmt(percent, f)
    }
}

/// allocates a fixed-size table, reporting allocation failure rather than aborting.
pub(crate) fn arena<T: Clone>(len: usize, value: T) -> Result<Box<[T]>, TryReserveError> {
    let mut arena = Vec::new();
    arena.try_reserve_exact(len)?;
    arena.resize(len, value);
    Ok(arena.into_boxed_slice())
}
