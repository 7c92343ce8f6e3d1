use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One observed piece of chat activity, as handed to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Stable chat or user identifier.
    pub subject_id: String,
    /// Whether the event counts as a command.
    pub is_command: bool,
    /// Unix seconds.
    pub timestamp: i64,
}

impl ChatEvent {
    pub fn new(subject_id: impl Into<String>, is_command: bool, timestamp: i64) -> Self {
        Self {
            subject_id: subject_id.into(),
            is_command,
            timestamp,
        }
    }
}

/// Current wall clock in Unix seconds.
///
/// Adapters call this; the aggregator always takes `now` as an argument.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}
