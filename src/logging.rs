//! Dual-sink structured logging: stderr plus an append-only log file.

use std::path::Path;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Handle that must be kept alive for the lifetime of the process; dropping
/// it stops the non-blocking file writer from flushing further records.
pub struct LoggingGuard {
    _file_guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Initialize the global `tracing` subscriber with a stderr layer and an
/// append-only file layer at `log_file`.
///
/// `base_level` comes from [`crate::config::Config::log_level`]; it is used
/// as the default [`EnvFilter`] directive and can be overridden at runtime
/// via the `RUST_LOG` environment variable.
pub fn init(base_level: &str, log_file: &Path) -> std::io::Result<LoggingGuard> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base_level));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);
    let file_layer = fmt::layer().with_ansi(false).with_writer(non_blocking);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
