use thiserror::Error;

/// Top-level error type for chatpulse.
#[derive(Debug, Error)]
pub enum ChatPulseError {
    /// Any failure talking to the shared event store. Never retried internally.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A setting the running process cannot act on, such as an unsupported store URL.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T, E = ChatPulseError> = std::result::Result<T, E>;
