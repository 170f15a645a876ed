//! a per-core cpu utilization monitor.

use {
    anyhow::Context,
    clap::Parser,
    corestat::{Args, CancellationToken, Config, Monitor, ProcStatFile, host, logging},
    log::info,
    std::{
        io::{self, BufWriter},
        process::ExitCode,
        sync::Arc,
    },
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}: {error:#}", env!("CARGO_PKG_NAME"));
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logger(args.log_level).context("failed to initialize logging")?;

    let cores = host::online_cores()?;
    let config = Config::from(&args);
    let source = ProcStatFile::new(&args.source);

    let token = Arc::new(CancellationToken::default());
    ctrlc::set_handler({
        let token = Arc::clone(&token);
        move || token.cancel()
    })
    .context("failed to install signal handler")?;

    let output = BufWriter::new(io::stdout());
    let mut monitor = Monitor::new(&config, cores, source, output)
        .with_context(|| format!("failed to start monitoring '{}'", args.source.display()))?;

    monitor.run(&token)?;
    info!("stopped");

    Ok(())
}
