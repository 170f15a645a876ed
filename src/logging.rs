use {log::LevelFilter, time::OffsetDateTime};

/// routes log messages at or above `min_level` to stderr.
///
/// stdout is reserved for reports.
pub fn init_logger(min_level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            // local time is unsound to query once other threads are running.
            let now = OffsetDateTime::now_utc()
                .format(time::macros::format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
                ))
                .unwrap_or_default();

            out.finish(format_args!(
                "{now} {:<5} {}: {message}",
                record.level(),
                record.target(),
            ))
        })
        .level(min_level)
        .chain(std::io::stderr())
        .apply()
}
