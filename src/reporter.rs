use {
    crate::{
        cancellation::CancellationToken,
        state::{SharedState, Utilization},
    },
    crossterm::{QueueableCommand, cursor, terminal},
    log::{debug, trace},
    std::{
        io::{self, Write},
        num::NonZeroU64,
        time::Duration,
    },
};

/// periodically renders the latest utilization of each core.
///
/// the reporter runs on its own timer and never waits for the analyzer. it may render the
/// same values twice, or miss a value that was replaced between two of its ticks.
pub struct Reporter<W> {
    output: W,
    /// how long to wait between reports.
    interval: Duration,
    /// stop after this many reports.
    limit: Option<NonZeroU64>,
    /// clear the terminal before each report.
    clear: bool,
    /// the number of reports rendered so far.
    reported: u64,
    /// results copied out of the shared state.
    buffer: Vec<Utilization>,
}

// === impl Reporter ===

impl<W: Write> Reporter<W> {
    pub fn new(output: W, interval: Duration) -> Self {
        Self {
            output,
            interval,
            limit: None,
            clear: false,
            reported: 0,
            buffer: Vec::new(),
        }
    }

    /// stops reporting after `limit` reports.
    pub fn with_limit(self, limit: Option<NonZeroU64>) -> Self {
        Self { limit, ..self }
    }

    /// clears the terminal before each report.
    pub fn with_clear(self, clear: bool) -> Self {
        Self { clear, ..self }
    }

    /// renders one line per core.
    ///
    /// the shared state is only locked long enough to copy the results out.
    pub fn report(&mut self, state: &SharedState) -> io::Result<()> {
        let Self {
            output,
            clear,
            buffer,
            reported,
            ..
        } = self;

        state.read_utilization(buffer);

        if *clear {
            output
                .queue(terminal::Clear(terminal::ClearType::All))?
                .queue(cursor::MoveTo(0, 0))?;
        }

        for (index, utilization) in buffer.iter().enumerate() {
            writeln!(output, "CPU Usage for core #{}: {utilization:.2}%", index + 1)?;
        }

        output.flush()?;
        *reported += 1;
        trace!("rendered report {reported}");

        Ok(())
    }

    /// reports every interval until `token` is cancelled.
    ///
    /// reaching the report limit cancels `token`, which stops the other workers too.
    pub fn run(&mut self, state: &SharedState, token: &CancellationToken) -> io::Result<()> {
        debug!("reporting every {:?}", self.interval);

        while !token.sleep_with_cancellation(self.interval) {
            self.report(state)?;

            if self.is_done() {
                debug!("rendered {} reports, stopping", self.reported);
                token.cancel();
                break;
            }
        }

        Ok(())
    }

    fn is_done(&self) -> bool {
        self.limit.is_some_and(|limit| self.reported >= limit.get())
    }

    /// the number of reports rendered so far.
    pub fn reported(&self) -> u64 {
        self.reported
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}
