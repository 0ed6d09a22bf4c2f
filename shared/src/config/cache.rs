//! Cache configuration module

use serde::{Deserialize, Serialize};

use super::{ConfigError, EnvReader};

/// Redis revocation cache configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis address as `host:port`
    pub address: String,

    /// Redis password, if the server requires one
    #[serde(default)]
    pub password: Option<String>,

    /// Redis database number (0-15)
    #[serde(default)]
    pub database: u8,

    /// Connection timeout in seconds
    pub connection_timeout: u64,

    /// Number of connection attempts made at startup
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
}

impl std::fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConfig")
            .field("address", &self.address)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("connection_timeout", &self.connection_timeout)
            .field("connect_attempts", &self.connect_attempts)
            .finish()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            address: String::from("localhost:6379"),
            password: None,
            database: 0,
            connection_timeout: 5,
            connect_attempts: default_connect_attempts(),
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration for an address
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Set the server password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the database number
    pub fn with_database(mut self, db: u8) -> Self {
        self.database = db.min(15);
        self
    }

    /// Connection URL understood by the redis client
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!("redis://:{}@{}/{}", password, self.address, self.database),
            None => format!("redis://{}/{}", self.address, self.database),
        }
    }

    /// Connection URL safe to log
    pub fn masked_url(&self) -> String {
        match &self.password {
            Some(_) => format!("redis://:***@{}/{}", self.address, self.database),
            None => self.url(),
        }
    }

    pub(crate) fn from_reader(env: &EnvReader<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            address: env.required("REDIS_ADDRESS", "localhost:6379")?,
            password: env.optional("REDIS_PASSWORD"),
            database: env.parsed_or::<u8>("REDIS_DATABASE", defaults.database)?.min(15),
            connection_timeout: env
                .parsed_or("REDIS_CONNECT_TIMEOUT", defaults.connection_timeout)?,
            connect_attempts: env.parsed_or("REDIS_CONNECT_ATTEMPTS", defaults.connect_attempts)?,
        })
    }
}

fn default_connect_attempts() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_without_password() {
        let config = CacheConfig::new("cache:6379").with_database(2);
        assert_eq!(config.url(), "redis://cache:6379/2");
        assert_eq!(config.masked_url(), "redis://cache:6379/2");
    }

    #[test]
    fn test_url_with_password_is_masked() {
        let config = CacheConfig::new("cache:6379").with_password("hunter2");
        assert_eq!(config.url(), "redis://:hunter2@cache:6379/0");
        assert_eq!(config.masked_url(), "redis://:***@cache:6379/0");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_database_is_clamped() {
        let config = CacheConfig::default().with_database(42);
        assert_eq!(config.database, 15);
    }
}
