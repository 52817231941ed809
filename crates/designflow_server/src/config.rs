//! Server configuration read from the process environment.

use designflow_core::default_log_level;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

pub const DB_PATH_VAR: &str = "DESIGNFLOW_DB_PATH";
pub const BIND_VAR: &str = "DESIGNFLOW_BIND";
pub const LOG_LEVEL_VAR: &str = "DESIGNFLOW_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "DESIGNFLOW_LOG_DIR";

const DEFAULT_BIND: &str = "127.0.0.1:8787";
const DEFAULT_DB_FILE: &str = "designflow.sqlite3";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid DESIGNFLOW_BIND `{value}`: {source}")]
    InvalidBind {
        value: String,
        #[source]
        source: AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub bind: SocketAddr,
    pub log_level: String,
    /// File logging is off when unset.
    pub log_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE));
        let bind_value = read(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_value
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBind {
                value: bind_value.clone(),
                source,
            })?;
        let log_level = read(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string());
        let log_dir = read(LOG_DIR_VAR).map(PathBuf::from);

        Ok(Self {
            db_path,
            bind,
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig, BIND_VAR, DB_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let config = config_from(&[(LOG_DIR_VAR, "   ")]).unwrap();
        assert_eq!(config.bind.to_string(), "127.0.0.1:8787");
        assert!(config.db_path.ends_with("designflow.sqlite3"));
        assert!(config.log_dir.is_none());
        assert!(["debug", "info"].contains(&config.log_level.as_str()));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            (DB_PATH_VAR, "/var/lib/designflow/main.db"),
            (BIND_VAR, "0.0.0.0:9000"),
            (LOG_LEVEL_VAR, "warn"),
            (LOG_DIR_VAR, "/var/log/designflow"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/designflow/main.db"));
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/designflow")));
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let err = config_from(&[(BIND_VAR, "localhost")]).unwrap_err();
        assert!(err.to_string().contains("DESIGNFLOW_BIND"));
    }
}
