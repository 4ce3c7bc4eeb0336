//! Process configuration for store, logging and monitor access.
//!
//! Values come from the environment, optionally seeded from a `.env` file.
//!
//! | Variable                        | Required | Default            |
//! |---------------------------------|----------|--------------------|
//! | `QARECORD_DB_PATH`              | yes      |                    |
//! | `QARECORD_LOG_LEVEL`            | no       | build-mode default |
//! | `QARECORD_LOG_DIR`              | no       | stderr             |
//! | `QARECORD_MONITOR_URL`          | no       | monitor disabled   |
//! | `QARECORD_MONITOR_TIMEOUT_SECS` | no       | `10`               |

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "QARECORD_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "QARECORD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "QARECORD_LOG_DIR";
pub const ENV_MONITOR_URL: &str = "QARECORD_MONITOR_URL";
pub const ENV_MONITOR_TIMEOUT_SECS: &str = "QARECORD_MONITOR_TIMEOUT_SECS";

const DEFAULT_MONITOR_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required setting `{key}`"),
            Self::Invalid { key, message } => write!(f, "invalid setting `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved configuration of the QA record core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub monitor_url: Option<String>,
    pub monitor_timeout: Duration,
}

impl CoreConfig {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = non_empty(ENV_DB_PATH)
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing(ENV_DB_PATH))?;

        let monitor_timeout = match non_empty(ENV_MONITOR_TIMEOUT_SECS) {
            Some(value) => {
                let secs: u64 = value.parse().map_err(|_| ConfigError::Invalid {
                    key: ENV_MONITOR_TIMEOUT_SECS,
                    message: format!("expected whole seconds, got `{value}`"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        key: ENV_MONITOR_TIMEOUT_SECS,
                        message: "timeout must be at least 1 second".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_MONITOR_TIMEOUT,
        };

        Ok(Self {
            db_path,
            log_level: non_empty(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: non_empty(ENV_LOG_DIR),
            monitor_url: non_empty(ENV_MONITOR_URL),
            monitor_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DB_PATH, ENV_MONITOR_TIMEOUT_SECS};
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn db_path_is_required() {
        let err = CoreConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_DB_PATH));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/var/lib/qarecord/qa.sqlite3"),
            ("QARECORD_MONITOR_URL", "  "),
        ]))
        .unwrap();
        assert_eq!(config.monitor_url, None);
        assert_eq!(config.monitor_timeout, Duration::from_secs(10));
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn timeout_must_be_positive_integer() {
        for bad in ["0", "ten", "-3"] {
            let err = CoreConfig::from_lookup(lookup_from(&[
                (ENV_DB_PATH, "qa.sqlite3"),
                (ENV_MONITOR_TIMEOUT_SECS, bad),
            ]))
            .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid {
                    key: ENV_MONITOR_TIMEOUT_SECS,
                    ..
                }
            ));
        }
    }
}
