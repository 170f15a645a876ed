//! argument parsing via clap.

use {
    crate::source::ProcStatFile,
    clap::{Parser, crate_authors, crate_description, crate_name, crate_version},
    log::LevelFilter,
    std::{num::NonZeroU64, path::PathBuf, time::Duration},
};

/// the arguments for corestat.
#[derive(Parser, Debug)]
#[command(
    name = crate_name!(),
    version = crate_version!(),
    author = crate_authors!(),
    about = crate_description!(),
)]
pub struct Args {
    /// Seconds between samples of the cpu counters.
    #[arg(short, long, value_name = "SECONDS", default_value = "1")]
    pub interval: NonZeroU64,

    /// Seconds between reports. Defaults to the sampling interval.
    #[arg(long, value_name = "SECONDS")]
    pub report_interval: Option<NonZeroU64>,

    /// Where to read cpu counters from, in the format of `/proc/stat`.
    #[arg(short, long, value_name = "PATH", default_value = ProcStatFile::STAT)]
    pub source: PathBuf,

    /// Exit after this many reports, rather than running until interrupted.
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub reports: Option<NonZeroU64>,

    /// Clear the terminal before each report.
    #[arg(short, long)]
    pub clear: bool,

    /// Which log messages to write to stderr.
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: LevelFilter,
}

/// how the monitor runs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// time between samples.
    pub interval: Duration,
    /// time between reports.
    pub report_interval: Duration,
    /// stop after this many reports.
    pub reports: Option<NonZeroU64>,
    /// clear the terminal before each report.
    pub clear: bool,
}

// === impl Config ===

impl Default for Config {
    fn default() -> Self {
        const INTERVAL: Duration = Duration::from_secs(1);

        Self {
            interval: INTERVAL,
            report_interval: INTERVAL,
            reports: None,
            clear: false,
        }
    }
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        let Args {
            interval,
            report_interval,
            reports,
            clear,
            source: _,
            log_level: _,
        } = *args;

        let seconds = |secs: NonZeroU64| Duration::from_secs(secs.get());

        Self {
            interval: seconds(interval),
            report_interval: seconds(report_interval.unwrap_or(interval)),
            reports,
            clear,
        }
    }
}
