//! Operator configuration read from the environment

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const WATCH_NAMESPACE_ENV: &str = "KEYCLOAK_OPERATOR_WATCH_NAMESPACE";
pub const REQUEUE_SECS_ENV: &str = "KEYCLOAK_OPERATOR_REQUEUE_SECS";
pub const ERROR_REQUEUE_SECS_ENV: &str = "KEYCLOAK_OPERATOR_ERROR_REQUEUE_SECS";
pub const CONFLICT_REQUEUE_SECS_ENV: &str = "KEYCLOAK_OPERATOR_CONFLICT_REQUEUE_SECS";
pub const LOG_FORMAT_ENV: &str = "KEYCLOAK_OPERATOR_LOG_FORMAT";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidDuration { name: &'static str, value: String },

    #[error("{name} must be \"text\" or \"json\", got {value:?}")]
    InvalidLogFormat { name: &'static str, value: String },
}

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OperatorConfig {
    /// Namespace to watch; `None` watches all namespaces
    pub watch_namespace: Option<String>,
    /// Requeue interval after a successful reconciliation
    pub requeue: Duration,
    /// Requeue interval after a failed reconciliation
    pub error_requeue: Duration,
    /// Requeue interval after a write conflict
    pub conflict_requeue: Duration,
    pub log_format: LogFormat,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            watch_namespace: None,
            requeue: Duration::from_secs(300),
            error_requeue: Duration::from_secs(60),
            conflict_requeue: Duration::from_secs(5),
            log_format: LogFormat::Text,
        }
    }
}

impl OperatorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from `lookup`, falling back to defaults for
    /// unset or empty variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let log_format = match lookup(LOG_FORMAT_ENV) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidLogFormat {
                    name: LOG_FORMAT_ENV,
                    value,
                })?,
            None => defaults.log_format,
        };

        Ok(Self {
            watch_namespace: lookup(WATCH_NAMESPACE_ENV).map(|ns| ns.trim().to_string()),
            requeue: seconds(REQUEUE_SECS_ENV, lookup(REQUEUE_SECS_ENV), defaults.requeue)?,
            error_requeue: seconds(
                ERROR_REQUEUE_SECS_ENV,
                lookup(ERROR_REQUEUE_SECS_ENV),
                defaults.error_requeue,
            )?,
            conflict_requeue: seconds(
                CONFLICT_REQUEUE_SECS_ENV,
                lookup(CONFLICT_REQUEUE_SECS_ENV),
                defaults.conflict_requeue,
            )?,
            log_format,
        })
    }
}

fn seconds(
    name: &'static str,
    value: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidDuration { name, value }),
    }
}
