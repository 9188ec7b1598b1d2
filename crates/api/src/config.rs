//! Process configuration, read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use codecamp_observability::LogFormat;

use crate::app::versioning::ApiVersion;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Where camps are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    InMemory,
    Postgres { url: String, max_connections: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub persistence: Persistence,
    /// Insert the sample camps when the store is empty.
    pub seed_sample_data: bool,
    /// Version assumed for requests whose URL carries none.
    pub default_api_version: ApiVersion,
    pub log_format: LogFormat,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_or(&lookup, "BIND_ADDR", || {
            SocketAddr::from_str(DEFAULT_BIND_ADDR).map_err(|e| e.to_string())
        })?;

        let persistent = parse_or(&lookup, "USE_PERSISTENT_STORES", || Ok(false))?;
        let persistence = if persistent {
            let url = lookup("DATABASE_URL")
                .filter(|url| !url.trim().is_empty())
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", || Ok(DEFAULT_MAX_CONNECTIONS))?;
            Persistence::Postgres { url, max_connections }
        } else {
            Persistence::InMemory
        };

        Ok(Self {
            bind_addr,
            persistence,
            seed_sample_data: parse_or(&lookup, "SEED_SAMPLE_DATA", || Ok(true))?,
            default_api_version: parse_or(&lookup, "DEFAULT_API_VERSION", || Ok(ApiVersion::V1_1))?,
            log_format: parse_or(&lookup, "LOG_FORMAT", || Ok(LogFormat::Json))?,
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            persistence: Persistence::InMemory,
            seed_sample_data: true,
            default_api_version: ApiVersion::V1_1,
            log_format: LogFormat::Json,
        }
    }
}

fn parse_or<T, F, D>(lookup: &F, var: &'static str, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
    D: FnOnce() -> Result<T, String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => {
            value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                value: value.clone(),
                reason: e.to_string(),
            })
        }
        _ => default().map_err(|reason| ConfigError::Invalid {
            var,
            value: String::new(),
            reason,
        }),
    }
}
