//! Server configuration module

use serde::{Deserialize, Serialize};

use super::{ConfigError, EnvReader};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,

    /// Deadline in milliseconds applied to every store and cache call
    #[serde(default = "default_backend_timeout_ms")]
    pub backend_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            workers: 0,
            backend_timeout_ms: default_backend_timeout_ms(),
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub(crate) fn from_reader(env: &EnvReader<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            host: env.optional("SERVER_HOST").unwrap_or(defaults.host),
            port: env.parsed_or("SERVER_PORT", defaults.port)?,
            workers: env.parsed_or("SERVER_WORKERS", defaults.workers)?,
            backend_timeout_ms: env.parsed_or("BACKEND_TIMEOUT_MS", defaults.backend_timeout_ms)?,
        };
        if config.backend_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "BACKEND_TIMEOUT_MS".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(config)
    }
}

fn default_backend_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::lookup;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.workers, 0);
        assert_eq!(config.backend_timeout_ms, 5000);
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(ServerConfig::new("localhost", 3000).bind_address(), "localhost:3000");
    }

    #[test]
    fn test_from_reader_overrides() {
        let lookup = lookup(&[("SERVER_PORT", "9090"), ("BACKEND_TIMEOUT_MS", "250")]);
        let config = ServerConfig::from_reader(&EnvReader::new(&lookup)).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.backend_timeout_ms, 250);
    }

    #[test]
    fn test_zero_backend_timeout_rejected() {
        let lookup = lookup(&[("BACKEND_TIMEOUT_MS", "0")]);
        assert!(ServerConfig::from_reader(&EnvReader::new(&lookup)).is_err());
    }

    #[test]
    fn test_bad_port_rejected() {
        let lookup = lookup(&[("SERVER_PORT", "http")]);
        let err = ServerConfig::from_reader(&EnvReader::new(&lookup)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "SERVER_PORT"));
    }
}
