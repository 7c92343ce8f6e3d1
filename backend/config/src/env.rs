//! Configuration loading from process environment variables.
//!
//! `*_with` variants take an explicit map so tests never touch the real environment.

use std::collections::HashMap;

use thiserror::Error;

use crate::defaults::{
    DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT, DEFAULT_KEY_PREFIX, DEFAULT_LOG_LEVEL,
    DEFAULT_REDIS_URL,
};
use crate::schema::{BotConfig, StoreConfig};
use crate::validation::validate;

pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const ENV_REDIS_URL: &str = "REDIS_URL";
pub const ENV_HTTP_HOST: &str = "HTTP_HOST";
pub const ENV_HTTP_PORT: &str = "HTTP_PORT";
pub const ENV_KEY_PREFIX: &str = "METRICS_KEY_PREFIX";
pub const ENV_LOG_LEVEL: &str = "RUST_LOG";
pub const ENV_LOG_DIR: &str = "LOG_DIR";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required env: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for {var}: {message}")]
    Invalid { var: String, message: String },
}

/// Load the bot configuration from the process environment.
pub fn load_from_env() -> Result<BotConfig, ConfigError> {
    load_from_env_with(&std::env::vars().collect())
}

/// Load only the store settings (no bot token needed).
pub fn load_store_from_env() -> Result<StoreConfig, ConfigError> {
    load_store_from_env_with(&std::env::vars().collect())
}

pub fn load_from_env_with(env: &HashMap<String, String>) -> Result<BotConfig, ConfigError> {
    let telegram_token = non_empty(env, ENV_TELEGRAM_TOKEN)
        .ok_or(ConfigError::MissingEnv(ENV_TELEGRAM_TOKEN))?;

    let http_port = match non_empty(env, ENV_HTTP_PORT) {
        Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
            var: ENV_HTTP_PORT.to_string(),
            message: e.to_string(),
        })?,
        None => DEFAULT_HTTP_PORT,
    };

    let config = BotConfig {
        telegram_token,
        store: load_store_from_env_with(env)?,
        http_host: non_empty(env, ENV_HTTP_HOST).unwrap_or_else(|| DEFAULT_HTTP_HOST.to_string()),
        http_port,
        log_level: non_empty(env, ENV_LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        log_dir: non_empty(env, ENV_LOG_DIR),
    };

    validate(&config)?;
    Ok(config)
}

pub fn load_store_from_env_with(env: &HashMap<String, String>) -> Result<StoreConfig, ConfigError> {
    let store = StoreConfig {
        redis_url: non_empty(env, ENV_REDIS_URL).unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
        key_prefix: env
            .get(ENV_KEY_PREFIX)
            .cloned()
            .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string()),
    };
    crate::validation::validate_store(&store)?;
    Ok(store)
}

fn non_empty(env: &HashMap<String, String>, key: &str) -> Option<String> {
    env.get(key).filter(|v| !v.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn applies_defaults() {
        let cfg = load_from_env_with(&env(&[("TELEGRAM_TOKEN", "123:abc")])).unwrap();
        assert_eq!(cfg.telegram_token, "123:abc");
        assert_eq!(cfg.store.redis_url, "redis://redis:6379/0");
        assert_eq!(cfg.store.key_prefix, "metrics");
        assert_eq!(cfg.bind_address(), "0.0.0.0:8000");
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.log_dir.is_none());
    }

    #[test]
    fn missing_token_is_fatal() {
        let err = load_from_env_with(&HashMap::new()).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnv("TELEGRAM_TOKEN"));
        assert!(err.to_string().contains("TELEGRAM_TOKEN"));
    }

    #[test]
    fn empty_token_is_missing() {
        let err = load_from_env_with(&env(&[("TELEGRAM_TOKEN", "")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnv("TELEGRAM_TOKEN"));
    }

    #[test]
    fn overrides_are_honoured() {
        let cfg = load_from_env_with(&env(&[
            ("TELEGRAM_TOKEN", "t"),
            ("REDIS_URL", "memory://"),
            ("HTTP_HOST", "127.0.0.1"),
            ("HTTP_PORT", "9100"),
            ("METRICS_KEY_PREFIX", "bot42"),
            ("LOG_DIR", "/var/log/chatpulse"),
        ]))
        .unwrap();
        assert_eq!(cfg.store.redis_url, "memory://");
        assert_eq!(cfg.store.key_prefix, "bot42");
        assert_eq!(cfg.bind_address(), "127.0.0.1:9100");
        assert_eq!(cfg.log_dir.as_deref(), Some("/var/log/chatpulse"));
    }

    #[test]
    fn bad_port_is_invalid() {
        let err = load_from_env_with(&env(&[("TELEGRAM_TOKEN", "t"), ("HTTP_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "HTTP_PORT"));
    }

    #[test]
    fn store_settings_do_not_need_token() {
        let store = load_store_from_env_with(&HashMap::new()).unwrap();
        assert_eq!(store.redis_url, "redis://redis:6379/0");
    }
}
