pub mod error;
pub mod event;
pub mod types;

pub use error::{ChatPulseError, Result};
pub use event::{unix_now, ChatEvent};
pub use types::Snapshot;
