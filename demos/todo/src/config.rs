//! Demo configuration, read from the environment.

use crate::api::DEFAULT_DELAY;
use std::num::ParseIntError;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the mock API latency in milliseconds
pub const API_DELAY_VAR: &str = "TODO_API_DELAY_MS";

/// Errors raised while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("Invalid value {value:?} for {name}: {source}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value found
        value: String,
        /// Parse failure
        #[source]
        source: ParseIntError,
    },
}

/// Settings for the todo binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    /// Latency of the mock API
    pub api_delay: Duration,
}

impl AppConfig {
    /// Read configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `TODO_API_DELAY_MS` is set to
    /// something other than a whole number of milliseconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup` instead of the environment
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_delay = match lookup(API_DELAY_VAR) {
            None => DEFAULT_DELAY,
            Some(raw) => {
                let millis = raw.trim().parse::<u64>().map_err(|source| ConfigError::Invalid {
                    name: API_DELAY_VAR,
                    value: raw.clone(),
                    source,
                })?;
                Duration::from_millis(millis)
            }
        };

        Ok(Self { api_delay })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_delay: DEFAULT_DELAY,
        }
    }
}
