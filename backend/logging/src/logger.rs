//! Structured Logger
//!
//! Wraps `tracing` to provide JSON-formatted output, optional file rotation (NDJSON),
//! and environment-based level control.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name stem for rolled log files (`chatpulse.log.YYYY-MM-DD`).
pub const LOG_FILE_PREFIX: &str = "chatpulse.log";

/// Build the level filter: `RUST_LOG` wins, otherwise `level`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global structured logger.
///
/// Always logs JSON to stdout; when `log_dir` is given, also writes NDJSON to a daily-rolled file.
/// Calling it twice is harmless: the second call leaves the first subscriber in place.
pub fn init_logger(level: &str, log_dir: Option<&Path>) {
    let console_layer = fmt::layer()
        .json()
        .with_writer(std::io::stdout);

    let file_layer = log_dir.map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer()
            .json()
            .with_writer(appender)
            .with_ansi(false)
            .boxed()
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
