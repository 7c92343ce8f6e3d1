//! Default values for optional settings.

/// Default store URL.
pub const DEFAULT_REDIS_URL: &str = "redis://redis:6379/0";

/// Default bind host for the scrape endpoint.
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default bind port for the scrape endpoint.
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Default store key namespace.
pub const DEFAULT_KEY_PREFIX: &str = "metrics";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";
