//! `chatpulse-config`: runtime configuration for the chatpulse bot.
//!
//! Provides:
//! - Typed config (bot token, store, scrape listener, logging)
//! - Environment loading with defaults
//! - Validation of values parsing alone does not catch
//! - Secret redaction for safe logging

pub mod defaults;
pub mod env;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::{
    load_from_env, load_from_env_with, load_store_from_env, load_store_from_env_with, ConfigError,
};
pub use redact::{redact_token, redact_url};
pub use schema::{BotConfig, StoreConfig};
