use std::fmt;

use crate::redact::{redact_token, redact_url};

/// Where usage state lives.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// `redis://...` or `memory://`
    pub redis_url: String,
    /// Namespace for every store key.
    pub key_prefix: String,
}

/// Full runtime configuration for the bot process.
#[derive(Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub telegram_token: String,
    pub store: StoreConfig,
    pub http_host: String,
    pub http_port: u16,
    pub log_level: String,
    /// When set, logs are also written here as daily-rolled NDJSON.
    pub log_dir: Option<String>,
}

impl BotConfig {
    /// `host:port` for the scrape listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("redis_url", &redact_url(&self.redis_url))
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("telegram_token", &redact_token(&self.telegram_token))
            .field("store", &self.store)
            .field("http_host", &self.http_host)
            .field("http_port", &self.http_port)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}
