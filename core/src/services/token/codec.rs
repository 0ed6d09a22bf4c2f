//! Stateless token signing and verification

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::domain::entities::token::{Claims, Token, TokenKind};
use crate::errors::{DomainError, DomainResult, TokenError};

/// Signs and verifies compact JWS tokens with symmetric secrets
///
/// Tokens are always signed with HS256. Verification accepts any member of
/// the HMAC family, applies no clock leeway and requires the issuer to be the
/// configured service name.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    issuer: String,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);

        Self { issuer, validation }
    }

    /// Mints a token for `user_id`
    ///
    /// The token gets a fresh v4 jti and `iat = nbf = now`, `exp = now + duration`.
    /// A signing failure is reported as a backend error.
    pub fn sign(
        &self,
        user_id: &str,
        kind: TokenKind,
        duration: Duration,
        secret: &str,
        subject: &str,
    ) -> DomainResult<Token> {
        let now = Utc::now().timestamp();
        let exp = now + duration.num_seconds();
        let claims = Claims {
            user_id: user_id.to_string(),
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            nbf: now,
            exp,
        };

        let value = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| DomainError::backend(format!("token signing failed: {}", e)))?;

        Ok(Token {
            kind,
            value,
            jti: claims.jti,
            subject: claims.sub,
            issued_at: timestamp(now)?,
            expires_at: timestamp(exp)?,
        })
    }

    /// Verifies `value` against `secret` and returns its claims
    pub fn verify(&self, value: &str, secret: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(value, &DecodingKey::from_secret(secret.as_bytes()), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::ImmatureSignature => TokenError::NotYetValid,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::UnsupportedAlgorithm
                }
                ErrorKind::InvalidIssuer
                | ErrorKind::InvalidSubject
                | ErrorKind::MissingRequiredClaim(_) => TokenError::InvalidClaims,
                _ => TokenError::Malformed,
            })
    }
}

fn timestamp(secs: i64) -> DomainResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DomainError::invalid_input("token lifetime out of range"))
}
