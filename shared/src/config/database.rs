//! Database configuration module

use serde::{Deserialize, Serialize};

use super::{ConfigError, EnvReader};

/// Credential store connection configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Auth token for remote libsql-compatible deployments
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout: u64,

    /// Slow query threshold in milliseconds
    #[serde(default = "default_slow_query_threshold")]
    pub slow_query_threshold: u64,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .field("slow_query_threshold", &self.slow_query_threshold)
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::from("sqlite://authsvc.db?mode=rwc"),
            auth_token: None,
            max_connections: 10,
            connect_timeout: 30,
            idle_timeout: 600,
            slow_query_threshold: default_slow_query_threshold(),
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Whether the URL points at a private in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    pub(crate) fn from_reader(env: &EnvReader<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            url: env.required("DATABASE_URL", "sqlite://authsvc.db?mode=rwc")?,
            auth_token: env.optional("DATABASE_AUTH_TOKEN"),
            max_connections: env
                .parsed_or("DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            connect_timeout: env.parsed_or("DATABASE_CONNECT_TIMEOUT", defaults.connect_timeout)?,
            idle_timeout: defaults.idle_timeout,
            slow_query_threshold: defaults.slow_query_threshold,
        })
    }
}

fn default_slow_query_threshold() -> u64 {
    1000 // 1 second
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_detection() {
        assert!(DatabaseConfig::new("sqlite::memory:").is_in_memory());
        assert!(DatabaseConfig::new("sqlite://file?mode=memory&cache=shared").is_in_memory());
        assert!(!DatabaseConfig::default().is_in_memory());
    }

    #[test]
    fn test_auth_token_redacted() {
        let config = DatabaseConfig {
            auth_token: Some("super.secret_token".to_string()),
            ..DatabaseConfig::default()
        };
        assert!(!format!("{:?}", config).contains("super.secret_token"));
    }
}
