//! Token signing configuration

use serde::{Deserialize, Serialize};

use super::{ConfigError, EnvReader};

/// Default access token lifetime in seconds (5 minutes)
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 300;

/// Default refresh token lifetime in seconds (7 days)
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 604_800;

/// Longest lifetime accepted for any token, in seconds (10 years)
pub const MAX_TOKEN_EXPIRY: i64 = 315_360_000;

/// JWT signing configuration
///
/// Access and refresh tokens are signed with independent secrets so that a
/// leaked secret for one class cannot be used to forge the other.
#[derive(Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret for signing access tokens
    pub access_secret: String,

    /// Secret for signing refresh tokens
    pub refresh_secret: String,

    /// Issuer claim, the service name
    pub issuer: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish()
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with default lifetimes
    pub fn new(
        issuer: impl Into<String>,
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            issuer: issuer.into(),
            access_token_expiry: DEFAULT_ACCESS_TOKEN_EXPIRY,
            refresh_token_expiry: DEFAULT_REFRESH_TOKEN_EXPIRY,
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    pub(crate) fn from_reader(env: &EnvReader<'_>) -> Result<Self, ConfigError> {
        let config = Self {
            access_secret: env.required("ACCESS_TOKEN_SECRET", "is-it-secret-?-is-it-safe-?")?,
            refresh_secret: env.required("REFRESH_TOKEN_SECRET", "keep-it-secret-keep-it-safe")?,
            issuer: env.required("SERVICE_NAME", "auth-service-1")?,
            access_token_expiry: env.parsed_or("ACCESS_TOKEN_EXPIRY", DEFAULT_ACCESS_TOKEN_EXPIRY)?,
            refresh_token_expiry: env
                .parsed_or("REFRESH_TOKEN_EXPIRY", DEFAULT_REFRESH_TOKEN_EXPIRY)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the token engine relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::Invalid {
                name: "REFRESH_TOKEN_SECRET".to_string(),
                reason: "must differ from ACCESS_TOKEN_SECRET".to_string(),
            });
        }
        if self.access_token_expiry <= 0 {
            return Err(ConfigError::Invalid {
                name: "ACCESS_TOKEN_EXPIRY".to_string(),
                reason: "must be a positive number of seconds".to_string(),
            });
        }
        if self.refresh_token_expiry > MAX_TOKEN_EXPIRY {
            return Err(ConfigError::Invalid {
                name: "REFRESH_TOKEN_EXPIRY".to_string(),
                reason: format!("must not exceed {} seconds", MAX_TOKEN_EXPIRY),
            });
        }
        if self.refresh_token_expiry <= self.access_token_expiry {
            return Err(ConfigError::Invalid {
                name: "REFRESH_TOKEN_EXPIRY".to_string(),
                reason: "must be longer than the access token expiry".to_string(),
            });
        }
        Ok(())
    }
}
