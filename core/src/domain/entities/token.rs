//! Token entities for JWT-based sessions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{DomainError, DomainResult};

use super::user::require_non_blank;

/// Subject label carried by access tokens
pub const ACCESS_TOKEN_SUBJECT: &str = "access-token";

/// Subject label carried by refresh tokens
pub const REFRESH_TOKEN_SUBJECT: &str = "refresh-token";

/// Kinds of token the system knows about
///
/// Only `Access` and `Refresh` are issued today; the other kinds are reserved
/// and have no configured lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    PasswordReset,
    EmailVerification,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::PasswordReset => "password_reset",
            TokenKind::EmailVerification => "email_verification",
        }
    }

    /// Whether tokens of this kind are currently minted
    pub fn is_active(&self) -> bool {
        matches!(self, TokenKind::Access | TokenKind::Refresh)
    }

    /// Subject label embedded in tokens of this kind
    pub fn subject(&self) -> Option<&'static str> {
        match self {
            TokenKind::Access => Some(ACCESS_TOKEN_SUBJECT),
            TokenKind::Refresh => Some(REFRESH_TOKEN_SUBJECT),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenKind::Access),
            "refresh" => Ok(TokenKind::Refresh),
            "password_reset" => Ok(TokenKind::PasswordReset),
            "email_verification" => Ok(TokenKind::EmailVerification),
            other => Err(DomainError::invalid_input(format!("unknown token kind: {}", other))),
        }
    }
}

/// Claims structure for JWT payload
///
/// Timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user
    pub user_id: String,

    /// Issuer, the service name
    pub iss: String,

    /// Subject label, see [`TokenKind::subject`]
    pub sub: String,

    /// JWT ID, the revocation handle
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// A signed token as handed to a client
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Compact JWS
    pub value: String,
    pub jti: String,
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind)
            .field("value", &"<redacted>")
            .field("jti", &self.jti)
            .field("subject", &self.subject)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Token {
    /// Builds the persisted record for this token
    pub fn metadata(&self, user_id: impl Into<String>) -> TokenMetadata {
        TokenMetadata {
            jti: self.jti.clone(),
            user_id: user_id.into(),
            kind: self.kind,
            token_hash: hash_token_value(&self.value),
            issued_at: self.issued_at,
            expires_at: self.expires_at,
        }
    }
}

/// Stored record of an issued token; never contains the signed value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub jti: String,
    pub user_id: String,
    pub kind: TokenKind,
    /// SHA-256 hex digest of the signed value
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenMetadata {
    /// Validates the record against the clock at `now`
    pub fn validate_at(&self, now: DateTime<Utc>) -> DomainResult<()> {
        require_non_blank("jti", &self.jti)?;
        require_non_blank("user id", &self.user_id)?;
        require_non_blank("token hash", &self.token_hash)?;

        if self.issued_at > now {
            return Err(DomainError::invalid_input("token issued in the future"));
        }
        if self.expires_at < now {
            return Err(DomainError::invalid_input("token already expired"));
        }
        Ok(())
    }

    /// Whether the token can still be presented at `now`
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Refresh and access token issued together
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub refresh: Token,
    pub access: Token,
}

impl TokenPair {
    pub fn new(refresh: Token, access: Token) -> Self {
        Self { refresh, access }
    }

    /// Refresh first, access second
    pub fn into_tuple(self) -> (Token, Token) {
        (self.refresh, self.access)
    }
}

/// SHA-256 hex digest of a signed token value
pub fn hash_token_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_token(kind: TokenKind) -> Token {
        let now = DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap();
        Token {
            kind,
            value: "header.payload.signature".to_string(),
            jti: "jti-1".to_string(),
            subject: kind.subject().unwrap_or_default().to_string(),
            issued_at: now,
            expires_at: now + Duration::minutes(5),
        }
    }

    #[test]
    fn test_token_kind_round_trip_names() {
        for kind in [
            TokenKind::Access,
            TokenKind::Refresh,
            TokenKind::PasswordReset,
            TokenKind::EmailVerification,
        ] {
            assert_eq!(kind.as_str().parse::<TokenKind>().unwrap(), kind);
        }
        assert!("bearer".parse::<TokenKind>().is_err());
    }

    #[test]
    fn test_only_access_and_refresh_are_active() {
        assert!(TokenKind::Access.is_active());
        assert!(TokenKind::Refresh.is_active());
        assert!(!TokenKind::PasswordReset.is_active());
        assert_eq!(TokenKind::EmailVerification.subject(), None);
        assert_eq!(TokenKind::Refresh.subject(), Some("refresh-token"));
    }

    #[test]
    fn test_hash_is_sha256_hex() {
        let digest = hash_token_value("abc");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_metadata_does_not_carry_value() {
        let token = sample_token(TokenKind::Access);
        let metadata = token.metadata("user-1");

        assert_eq!(metadata.jti, "jti-1");
        assert_eq!(metadata.user_id, "user-1");
        assert_eq!(metadata.token_hash, hash_token_value(&token.value));
        assert_ne!(metadata.token_hash, token.value);
        assert!(metadata.validate_at(Utc::now()).is_ok());
    }

    #[test]
    fn test_metadata_validation_rejects_bad_windows() {
        let token = sample_token(TokenKind::Refresh);
        let metadata = token.metadata("user-1");

        assert!(metadata.validate_at(token.issued_at - Duration::seconds(1)).is_err());
        assert!(metadata.validate_at(token.expires_at + Duration::seconds(1)).is_err());

        let mut blank = metadata.clone();
        blank.token_hash = String::new();
        assert!(blank.validate_at(Utc::now()).is_err());
    }

    #[test]
    fn test_debug_redacts_value() {
        let token = sample_token(TokenKind::Access);
        assert!(!format!("{:?}", token).contains("payload"));
    }

    #[test]
    fn test_pair_order() {
        let pair = TokenPair::new(sample_token(TokenKind::Refresh), sample_token(TokenKind::Access));
        let (first, second) = pair.into_tuple();
        assert_eq!(first.kind, TokenKind::Refresh);
        assert_eq!(second.kind, TokenKind::Access);
    }
}
