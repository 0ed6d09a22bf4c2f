//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token signing secrets, issuer and lifetimes
//! - `cache` - Redis revocation cache connection
//! - `database` - Credential store connection and pool
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server binding
//!
//! Configuration is read once at process start. Missing required values are
//! reported as a [`ConfigError`] so the binary can refuse to start instead of
//! failing later inside request handling.

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod server;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use auth::JwtConfig;
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;

/// Errors raised while loading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("env var {name} is not set, suggested value: {suggestion}")]
    Missing { name: String, suggestion: String },

    #[error("env var {name} has an invalid value: {reason}")]
    Invalid { name: String, reason: String },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Credential store configuration
    pub database: DatabaseConfig,

    /// Revocation cache configuration
    pub cache: CacheConfig,

    /// Token signing configuration
    pub jwt: JwtConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader::new(&lookup);
        let environment = env
            .optional("ENVIRONMENT")
            .map(|value| {
                value.parse().map_err(|reason| ConfigError::Invalid {
                    name: "ENVIRONMENT".to_string(),
                    reason,
                })
            })
            .transpose()?
            .unwrap_or_default();

        let mut logging = LoggingConfig::for_environment(environment);
        if let Some(level) = env.optional("LOG_LEVEL") {
            logging.level = level;
        }
        if let Some(format) = env.optional("LOG_FORMAT") {
            logging.format = format.parse().map_err(|reason| ConfigError::Invalid {
                name: "LOG_FORMAT".to_string(),
                reason,
            })?;
        }

        Ok(Self {
            environment,
            server: ServerConfig::from_reader(&env)?,
            database: DatabaseConfig::from_reader(&env)?,
            cache: CacheConfig::from_reader(&env)?,
            jwt: JwtConfig::from_reader(&env)?,
            logging,
        })
    }
}

/// Typed access to configuration variables
pub(crate) struct EnvReader<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl<'a> EnvReader<'a> {
    pub(crate) fn new(lookup: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self { lookup }
    }

    /// Returns the value of a variable, treating blank values as unset
    pub(crate) fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    pub(crate) fn required(&self, name: &str, suggestion: &str) -> Result<String, ConfigError> {
        self.optional(name).ok_or_else(|| ConfigError::Missing {
            name: name.to_string(),
            suggestion: suggestion.to_string(),
        })
    }

    pub(crate) fn parsed_or<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                name: name.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}
