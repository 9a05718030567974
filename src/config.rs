//! Process-level configuration loaded from the environment.

use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::task::services::TaskServiceConfig;

/// Environment variable naming the `PostgreSQL` connection URL.
pub const DATABASE_URL_VAR: &str = "TASKKEEPER_DATABASE_URL";
/// Fallback connection URL variable.
pub const FALLBACK_DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Environment variable for the connection pool size.
pub const POOL_MAX_SIZE_VAR: &str = "TASKKEEPER_POOL_MAX_SIZE";
/// Environment variable for the per-call store deadline in milliseconds.
pub const STORE_TIMEOUT_MS_VAR: &str = "TASKKEEPER_STORE_TIMEOUT_MS";
/// Environment variable for the log filter directive.
pub const LOG_FILTER_VAR: &str = "TASKKEEPER_LOG";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable held a value that could not be parsed.
    #[error("invalid value '{value}' for {variable}: {reason}")]
    InvalidValue {
        /// Variable name.
        variable: &'static str,
        /// Supplied value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Settings needed to wire a task service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `PostgreSQL` URL; `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_max_size: u32,
    /// Deadline applied to each store call.
    pub store_timeout: Option<Duration>,
    /// `tracing` filter directive.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            pool_max_size: 10,
            store_timeout: Some(Duration::from_secs(5)),
            log_filter: "info".to_owned(),
        }
    }
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first malformed
    /// variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which returns the value of a
    /// variable if set. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first malformed
    /// variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_url = read(DATABASE_URL_VAR).or_else(|| read(FALLBACK_DATABASE_URL_VAR));
        let pool_max_size = match read(POOL_MAX_SIZE_VAR) {
            Some(raw) => parse_pool_size(&raw)?,
            None => defaults.pool_max_size,
        };
        let store_timeout = match read(STORE_TIMEOUT_MS_VAR) {
            Some(raw) => parse_timeout(&raw)?,
            None => defaults.store_timeout,
        };
        let log_filter = read(LOG_FILTER_VAR).unwrap_or(defaults.log_filter);

        Ok(Self {
            database_url,
            pool_max_size,
            store_timeout,
            log_filter,
        })
    }

    /// Returns the service settings derived from this configuration.
    #[must_use]
    pub fn service_config(&self) -> TaskServiceConfig {
        self.store_timeout
            .map_or_else(TaskServiceConfig::default, |timeout| {
                TaskServiceConfig::default().with_store_timeout(timeout)
            })
    }
}

fn parse_pool_size(raw: &str) -> Result<u32, ConfigError> {
    let size = raw
        .trim()
        .parse::<u32>()
        .map_err(|err| invalid(POOL_MAX_SIZE_VAR, raw, err.to_string()))?;
    if size == 0 {
        return Err(invalid(POOL_MAX_SIZE_VAR, raw, "must be at least 1".to_owned()));
    }
    Ok(size)
}

/// A timeout of `0` disables the deadline.
fn parse_timeout(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let millis = raw
        .trim()
        .parse::<u64>()
        .map_err(|err| invalid(STORE_TIMEOUT_MS_VAR, raw, err.to_string()))?;
    Ok((millis > 0).then(|| Duration::from_millis(millis)))
}

fn invalid(variable: &'static str, value: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        variable,
        value: value.to_owned(),
        reason,
    }
}
