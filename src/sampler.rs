use {
    crate::{
        cancellation::CancellationToken,
        source::StatsSource,
        stat::{Snapshot, StatReadError},
        state::{Generation, MissingCores, SharedState},
    },
    log::{debug, trace},
    std::time::Duration,
    thiserror::Error,
};

/// periodically reads the counter source into the [`SharedState`].
pub struct Sampler<S> {
    /// the underlying source of kernel statistics.
    source: S,
    /// how long to wait between ticks.
    interval: Duration,
}

/// the counter source could not be sampled.
///
/// there is no degraded mode: stale counters would yield silently wrong percentages.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("failed to read cpu statistics")]
    Read(#[from] StatReadError),
    #[error("cpu statistics do not cover every core")]
    MissingCores(#[from] MissingCores),
}

// === impl Sampler ===

impl<S: StatsSource> Sampler<S> {
    pub fn new(source: S, interval: Duration) -> Self {
        Self { source, interval }
    }

    /// reads every core in one pass, and publishes the result.
    ///
    /// the analyzer is signalled only once the whole snapshot has been written.
    pub fn tick(&mut self, state: &SharedState) -> Result<Generation, SampleError> {
        let snapshot = Snapshot::read(&self.source)?;
        let generation = state.publish(&snapshot)?;
        trace!(
            "published generation {generation} ({} cpus)",
            snapshot.cpus.len()
        );
        Ok(generation)
    }

    /// ticks every interval until `token` is cancelled, or a sample fails.
    pub fn run(
        &mut self,
        state: &SharedState,
        token: &CancellationToken,
    ) -> Result<(), SampleError> {
        debug!("sampling every {:?}", self.interval);

        while !token.sleep_with_cancellation(self.interval) {
            self.tick(state)?;
        }

        debug!("sampler cancelled");
        Ok(())
    }
}
