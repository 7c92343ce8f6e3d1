//! Structured logging setup for chatpulse.

pub mod logger;

pub use logger::{env_filter, init_logger, LOG_FILE_PREFIX};
