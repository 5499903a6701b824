use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Installs the global subscriber writing to stdout through a background
/// worker. Keep the returned guard alive for the whole process so buffered
/// lines are flushed on exit.
pub fn logging_stdout() -> WorkerGuard {
    let (nonblocking, guard) = tracing_appender::non_blocking(std::io::stdout());

    let default_level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(nonblocking)
                .with_target(false)
                .with_file(cfg!(debug_assertions))
                .with_line_number(cfg!(debug_assertions)),
        )
        .with(filter)
        .init();

    guard
}
