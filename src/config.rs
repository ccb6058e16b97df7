//! Runtime configuration read from the environment.

use crate::role_cache::{DEFAULT_REFRESH_INTERVAL, MAX_REFRESH_INTERVAL};
use std::time::Duration;
use thiserror::Error;

pub const SERVICE_NAME_VAR: &str = "USERS_SERVICE_NAME";
pub const ROLE_CACHE_REFRESH_VAR: &str = "USERS_ROLE_CACHE_REFRESH_SECS";

const DEFAULT_SERVICE_NAME: &str = "users";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be greater than zero")]
    ZeroInterval { var: &'static str },

    #[error("{var} must be at most {max_secs} seconds")]
    TooLarge { var: &'static str, max_secs: u64 },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub service_name: String,
    /// How often the role cache reloads from its source.
    pub role_cache_refresh: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            role_cache_refresh: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

impl AppConfig {
    /// Reads `USERS_SERVICE_NAME` and `USERS_ROLE_CACHE_REFRESH_SECS`,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup(SERVICE_NAME_VAR) {
            if name.trim().is_empty() {
                return Err(ConfigError::Empty {
                    var: SERVICE_NAME_VAR,
                });
            }
            config.service_name = name;
        }

        if let Some(raw) = lookup(ROLE_CACHE_REFRESH_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: ROLE_CACHE_REFRESH_VAR,
                value: raw.clone(),
            })?;
            if secs == 0 {
                return Err(ConfigError::ZeroInterval {
                    var: ROLE_CACHE_REFRESH_VAR,
                });
            }
            if secs > MAX_REFRESH_INTERVAL.as_secs() {
                return Err(ConfigError::TooLarge {
                    var: ROLE_CACHE_REFRESH_VAR,
                    max_secs: MAX_REFRESH_INTERVAL.as_secs(),
                });
            }
            config.role_cache_refresh = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
