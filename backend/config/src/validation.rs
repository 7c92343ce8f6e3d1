//! Semantic checks that parsing alone does not catch.

use crate::env::{ConfigError, ENV_HTTP_PORT, ENV_KEY_PREFIX, ENV_REDIS_URL};
use crate::schema::{BotConfig, StoreConfig};

pub fn validate(config: &BotConfig) -> Result<(), ConfigError> {
    if config.http_port == 0 {
        return Err(invalid(ENV_HTTP_PORT, "port 0 is not a fixed bind port"));
    }
    validate_store(&config.store)
}

pub fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    if store.key_prefix.trim().is_empty() {
        return Err(invalid(ENV_KEY_PREFIX, "key prefix cannot be empty"));
    }
    let url = store.redis_url.as_str();
    let known_scheme = ["redis://", "rediss://", "redis+unix://", "unix://", "memory://"]
        .iter()
        .any(|scheme| url.starts_with(scheme));
    if !known_scheme {
        return Err(invalid(ENV_REDIS_URL, "expected a redis://, rediss:// or memory:// URL"));
    }
    Ok(())
}

fn invalid(var: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(url: &str, prefix: &str) -> StoreConfig {
        StoreConfig {
            redis_url: url.into(),
            key_prefix: prefix.into(),
        }
    }

    #[test]
    fn rejects_blank_prefix() {
        assert!(validate_store(&store("memory://", "  ")).is_err());
    }

    #[test]
    fn rejects_unknown_scheme() {
        let err = validate_store(&store("http://localhost:6379", "metrics")).unwrap_err();
        assert!(err.to_string().contains("REDIS_URL"));
    }

    #[test]
    fn rejects_port_zero() {
        let cfg = BotConfig {
            telegram_token: "t".into(),
            store: store("memory://", "metrics"),
            http_host: "0.0.0.0".into(),
            http_port: 0,
            log_level: "info".into(),
            log_dir: None,
        };
        assert!(validate(&cfg).is_err());
    }
}
