//! Store configuration loaded from the process environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `DATABASE_URL` | `sqlite::memory:` | SQLite connection URL |
//! | `DATABASE_MAX_CONNECTIONS` | `5` | Pool size (forced to 1 for in-memory databases) |
//! | `ORDER_REMOVE_STRICT` | `false` | Report `NotFound` when removing a missing order |

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// How `remove` treats an id that has no order row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RemovePolicy {
    /// Removing a missing order succeeds without doing anything.
    #[default]
    Idempotent,
    /// Removing a missing order fails with `NotFound`.
    Strict,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub remove_policy: RemovePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            remove_policy: RemovePolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Read configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            if url.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "DATABASE_URL",
                    value: url,
                    reason: "must not be empty".to_string(),
                });
            }
            config.database_url = url;
        }

        if let Some(raw) = lookup("DATABASE_MAX_CONNECTIONS") {
            config.max_connections = match raw.trim().parse::<u32>() {
                Ok(0) | Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        key: "DATABASE_MAX_CONNECTIONS",
                        value: raw,
                        reason: "expected a positive integer".to_string(),
                    });
                }
                Ok(n) => n,
            };
        }

        if let Some(raw) = lookup("ORDER_REMOVE_STRICT") {
            let strict = raw
                .trim()
                .parse::<bool>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "ORDER_REMOVE_STRICT",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
            config.remove_policy = if strict {
                RemovePolicy::Strict
            } else {
                RemovePolicy::Idempotent
            };
        }

        Ok(config)
    }

    /// Whether the URL names a private in-memory SQLite database.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert!(config.is_in_memory());
        assert_eq!(config.remove_policy, RemovePolicy::Idempotent);
    }

    #[test]
    fn reads_every_variable() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://orders.db"),
            ("DATABASE_MAX_CONNECTIONS", "8"),
            ("ORDER_REMOVE_STRICT", "true"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "sqlite://orders.db");
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.remove_policy, RemovePolicy::Strict);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn rejects_zero_connections() {
        let err = StoreConfig::from_lookup(lookup(&[("DATABASE_MAX_CONNECTIONS", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "DATABASE_MAX_CONNECTIONS", .. }
        ));
    }

    #[test]
    fn rejects_unparseable_strictness() {
        let err = StoreConfig::from_lookup(lookup(&[("ORDER_REMOVE_STRICT", "maybe")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "ORDER_REMOVE_STRICT", .. }
        ));
    }
}
