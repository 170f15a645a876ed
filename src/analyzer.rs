use {
    crate::{
        stat::{CpuTime, Measurement},
        state::{Generation, SharedState, Table, Utilization, arena},
    },
    log::{debug, trace, warn},
    std::collections::TryReserveError,
};


/// turns successive snapshots into per-core utilization.
///
/// the analyzer never polls. it wakes when the sampler publishes a new generation, computes
/// every core's utilization against the counters it saw last time, and goes back to sleep.
#[derive(Debug)]
pub struct Analyzer {
    /// the counters each slot held when last analyzed. this is never shared.
    previous: Box<[CpuTime]>,
    /// the last generation consumed.
    seen: Generation,
}

/// the outcome of one delta pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pass {
    /// the generation that was analyzed.
    pub generation: Generation,
    /// generations published since the previous pass that were never analyzed.
    pub skipped: u64,
    /// cores whose counters did not advance, and so kept their last utilization.
    pub stalled: usize,
}

// === impl Analyzer ===

impl Analyzer {
    /// creates an analyzer whose baseline is the state's current contents.
    ///
    /// the current generation counts as consumed; the first utilization is computed once the
    /// next one arrives.
    pub fn seed(state: &SharedState) -> Result<Self, TryReserveError> {
        let table = state.lock();

        let mut previous = arena(table.cores().len(), CpuTime::default())?;
        for (previous, core) in previous.iter_mut().zip(table.cores()) {
            *previous = core.counters;
        }

        Ok(Self {
            previous,
            seen: table.generation(),
        })
    }

    /// analyzes each fresh generation until the state is closed.
    pub fn run(&mut self, state: &SharedState) {
        while let Some(mut table) = state.wait_fresh(self.seen) {
            let pass = self.analyze(&mut table);
            drop(table);

            match pass {
                Some(pass) => pass.log(),
                None => trace!("generation {} was already analyzed", self.seen),
            }
        }

        debug!("analyzer stopped after generation {}", self.seen);
    }

    /// performs one delta pass over every core.
    ///
    /// a generation that was already consumed is left alone, and `None` is returned. when the
    /// counters did not advance, the last known utilization is kept.
    ///
    /// nothing is logged here, since the caller holds the table's lock.
    pub fn analyze(&mut self, table: &mut Table) -> Option<Pass> {
        let Self { previous, seen } = self;
        let generation = table.generation();

        let skipped = generation.since(*seen).checked_sub(1)?;

        // slot 0 is the aggregate, which is not reported.
        let mut stalled = 0;
        for (previous, core) in previous.iter_mut().zip(table.cores_mut()).skip(1) {
            match Measurement::new(previous, &core.counters).percentage() {
                Some(percent) => core.utilization = Utilization::new(percent),
                None => stalled += 1,
            }
            *previous = core.counters;
        }

        *seen = generation;

        Some(Pass {
            generation,
            skipped,
            stalled,
        })
    }

    /// the last generation consumed.
    pub fn seen(&self) -> Generation {
        self.seen
    }
}

// === impl Pass ===

impl Pass {
    fn log(&self) {
        let Self {
            generation,
            skipped,
            stalled,
        } = *self;

        if skipped > 0 {
            warn!("skipped {skipped} samples before generation {generation}");
        }
        if stalled > 0 {
            trace!("{stalled} cores did not advance; keeping their last utilization");
        }
        debug!("analyzed generation {generation}");
    }
}
