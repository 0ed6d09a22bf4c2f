//! Configuration for the session manager

use std::time::Duration;

use authsvc_shared::AppConfig;

use crate::services::token::TokenServiceConfig;

/// Default deadline for a single store or cache call
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Session manager configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Token secrets and lifetimes
    pub tokens: TokenServiceConfig,
    /// Deadline applied to every backend call
    pub backend_timeout: Duration,
}

impl SessionConfig {
    pub fn new(tokens: TokenServiceConfig) -> Self {
        Self {
            tokens,
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }

    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }
}

impl From<&AppConfig> for SessionConfig {
    fn from(config: &AppConfig) -> Self {
        Self::new(TokenServiceConfig::from(&config.jwt))
            .with_backend_timeout(Duration::from_millis(config.server.backend_timeout_ms))
    }
}
