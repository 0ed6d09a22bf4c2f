//! Configuration for the token codec and revocation policy

use authsvc_shared::config::auth::MAX_TOKEN_EXPIRY;
use authsvc_shared::JwtConfig;
use chrono::Duration;

use crate::domain::entities::token::TokenKind;

/// Per-kind secrets and lifetimes
#[derive(Clone)]
pub struct TokenServiceConfig {
    /// Issuer claim, the service name
    pub issuer: String,
    /// Secret for access tokens
    pub access_secret: String,
    /// Secret for refresh tokens
    pub refresh_secret: String,
    /// Access token lifetime
    pub access_token_expiry: Duration,
    /// Refresh token lifetime
    pub refresh_token_expiry: Duration,
}

impl std::fmt::Debug for TokenServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenServiceConfig")
            .field("issuer", &self.issuer)
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish_non_exhaustive()
    }
}

impl TokenServiceConfig {
    /// Secret used to sign and verify tokens of `kind`
    pub fn secret_for(&self, kind: TokenKind) -> Option<&str> {
        match kind {
            TokenKind::Access => Some(&self.access_secret),
            TokenKind::Refresh => Some(&self.refresh_secret),
            _ => None,
        }
    }

    /// Configured lifetime of `kind`; zero for kinds that are never minted
    pub fn duration_for(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_token_expiry,
            TokenKind::Refresh => self.refresh_token_expiry,
            _ => Duration::zero(),
        }
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            access_secret: config.access_secret.clone(),
            refresh_secret: config.refresh_secret.clone(),
            access_token_expiry: lifetime(config.access_token_expiry),
            refresh_token_expiry: lifetime(config.refresh_token_expiry),
        }
    }
}

// Validated configs never exceed the cap; anything larger is clamped to it.
fn lifetime(seconds: i64) -> Duration {
    Duration::try_seconds(seconds.min(MAX_TOKEN_EXPIRY)).unwrap_or_else(Duration::zero)
}
