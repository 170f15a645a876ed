//! a per-core cpu utilization monitor.
//!
//! three workers share one [`SharedState`]. the [`Sampler`] reads the kernel's cumulative
//! counters on a timer and publishes them as a new [`Generation`]. the [`Analyzer`] sleeps
//! until a generation it has not seen arrives, and turns the change since the previous one into
//! a percentage per core. the [`Reporter`] renders the latest percentages on its own timer, so
//! what it shows is eventually consistent with the analyzer rather than synchronized to it.

use {
    log::{debug, info},
    std::{
        collections::TryReserveError,
        io::{self, Write},
        panic, thread,
    },
    thiserror::Error,
};

pub use self::{
    analyzer::{Analyzer, Pass},
    cancellation::CancellationToken,
    host::CoreCount,
    options::{Args, Config},
    reporter::Reporter,
    sampler::{SampleError, Sampler},
    source::{MockStatFile, ProcStatFile, StatsSource},
    state::{Generation, SharedState, Utilization},
};

pub mod analyzer;
pub mod cancellation;
pub mod host;
pub mod logging;
pub mod options;
pub mod reporter;
pub mod sampler;
pub mod source;
/// kernel statistics facilities.
///
/// this provides tools to interact with `/proc/stat`.
pub mod stat;
pub mod state;

/// the sampler, analyzer, and reporter, wired to one [`SharedState`].
pub struct Monitor<S, W> {
    state: SharedState,
    sampler: Sampler<S>,
    analyzer: Analyzer,
    reporter: Reporter<W>,
}

/// a fatal error. the monitor has no degraded mode.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to allocate per-core state")]
    Alloc(#[from] TryReserveError),
    #[error(transparent)]
    Sample(#[from] SampleError),
    #[error("failed to write report")]
    Report(#[source] io::Error),
}

/// stops every worker once any one of them exits, including by panicking.
struct Shutdown<'a> {
    state: &'a SharedState,
    token: &'a CancellationToken,
}

// === impl Monitor ===

impl<S, W> Monitor<S, W>
where
    S: StatsSource,
    W: Write,
{
    /// allocates the shared state and takes a first sample.
    ///
    /// an unreadable or malformed counter source is reported here, before any worker starts.
    /// the analyzer's baseline is this first sample.
    pub fn new(
        config: &Config,
        cores: CoreCount,
        source: S,
        output: W,
    ) -> Result<Self, MonitorError> {
        let Config {
            interval,
            report_interval,
            reports,
            clear,
        } = *config;

        let state = SharedState::new(cores)?;
        let mut sampler = Sampler::new(source, interval);
        let generation = sampler.tick(&state)?;
        let analyzer = Analyzer::seed(&state)?;
        let reporter = Reporter::new(output, report_interval)
            .with_limit(reports)
            .with_clear(clear);

        info!(
            "monitoring {} cores, starting from generation {generation}",
            cores.get()
        );

        Ok(Self {
            state,
            sampler,
            analyzer,
            reporter,
        })
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn reporter(&self) -> &Reporter<W> {
        &self.reporter
    }
}

impl<S, W> Monitor<S, W>
where
    S: StatsSource + Send,
    W: Write + Send,
{
    /// runs the three workers until `token` is cancelled, the report limit is reached, or a
    /// fatal error occurs.
    ///
    /// every worker has stopped by the time this returns.
    pub fn run(&mut self, token: &CancellationToken) -> Result<(), MonitorError> {
        let Self {
            state,
            sampler,
            analyzer,
            reporter,
        } = self;
        let state = &*state;

        let (sampled, reported) = thread::scope(|s| {
            let sampler = s.spawn(move || {
                let _shutdown = Shutdown { state, token };
                sampler.run(state, token)
            });
            let analyzer = s.spawn(move || {
                let _shutdown = Shutdown { state, token };
                analyzer.run(state)
            });
            let reporter = s.spawn(move || {
                let _shutdown = Shutdown { state, token };
                reporter.run(state, token)
            });

            let sampled = join(sampler);
            join(analyzer);
            let reported = join(reporter);
            (sampled, reported)
        });

        debug!("all workers stopped");

        sampled?;
        reported.map_err(MonitorError::Report)
    }
}

/// joins a worker, resuming its panic on this thread.
fn join<T>(worker: thread::ScopedJoinHandle<'_, T>) -> T {
    worker
        .join()
        .unwrap_or_else(|payload| panic::resume_unwind(payload))
}

// === impl Shutdown ===

impl Drop for Shutdown<'_> {
    fn drop(&mut self) {
        let Self { state, token } = self;
        token.cancel();
        state.close();
    }
}
