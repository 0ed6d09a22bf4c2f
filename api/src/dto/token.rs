use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use authsvc_core::domain::entities::token::{Token, TokenKind, TokenPair};

/// Body carrying a single presented token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
    /// Expected kind, access when omitted
    #[serde(default)]
    pub kind: Option<TokenKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub kind: TokenKind,
    pub token: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Token> for TokenResponse {
    fn from(token: Token) -> Self {
        Self {
            kind: token.kind,
            token: token.value,
            jti: token.jti,
            expires_at: token.expires_at,
        }
    }
}

/// Refresh token at index 0, access token at index 1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPairResponse {
    pub tokens: Vec<TokenResponse>,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        let (refresh, access) = pair.into_tuple();
        Self {
            tokens: vec![refresh.into(), access.into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedResponse {
    pub revoked_at: DateTime<Utc>,
}
