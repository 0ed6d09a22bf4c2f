//! Unit tests for token signing and verification

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::domain::entities::token::{Claims, TokenKind, ACCESS_TOKEN_SUBJECT};
use crate::errors::TokenError;
use crate::services::token::TokenCodec;

const SECRET: &str = "is-it-secret-?-is-it-safe-?";
const ISSUER: &str = "auth-service-1";

fn codec() -> TokenCodec {
    TokenCodec::new(ISSUER)
}

fn claims_at(iat: i64, nbf: i64, exp: i64) -> Claims {
    Claims {
        user_id: "user-1".to_string(),
        iss: ISSUER.to_string(),
        sub: ACCESS_TOKEN_SUBJECT.to_string(),
        jti: "jti-1".to_string(),
        iat,
        nbf,
        exp,
    }
}

fn encode_with(alg: Algorithm, claims: &Claims, secret: &str) -> String {
    encode(&Header::new(alg), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

#[test]
fn test_sign_then_verify() {
    let codec = codec();
    let token = codec
        .sign("user-1", TokenKind::Access, Duration::minutes(5), SECRET, ACCESS_TOKEN_SUBJECT)
        .unwrap();

    assert_eq!(token.kind, TokenKind::Access);
    assert_eq!(token.subject, ACCESS_TOKEN_SUBJECT);
    assert_eq!(token.value.split('.').count(), 3);
    assert_eq!(token.expires_at - token.issued_at, Duration::minutes(5));

    let claims = codec.verify(&token.value, SECRET).unwrap();
    assert_eq!(claims.user_id, "user-1");
    assert_eq!(claims.iss, ISSUER);
    assert_eq!(claims.sub, ACCESS_TOKEN_SUBJECT);
    assert_eq!(claims.jti, token.jti);
    assert_eq!(claims.iat, claims.nbf);
    assert_eq!(claims.exp - claims.iat, 300);
}

#[test]
fn test_every_token_gets_a_fresh_jti() {
    let codec = codec();
    let a = codec
        .sign("user-1", TokenKind::Access, Duration::minutes(5), SECRET, ACCESS_TOKEN_SUBJECT)
        .unwrap();
    let b = codec
        .sign("user-1", TokenKind::Access, Duration::minutes(5), SECRET, ACCESS_TOKEN_SUBJECT)
        .unwrap();

    assert_ne!(a.jti, b.jti);
    assert!(uuid::Uuid::parse_str(&a.jti).is_ok());
}

#[test]
fn test_wrong_secret_is_rejected() {
    let codec = codec();
    let token = codec
        .sign("user-1", TokenKind::Access, Duration::minutes(5), SECRET, ACCESS_TOKEN_SUBJECT)
        .unwrap();

    assert_eq!(
        codec.verify(&token.value, "keep-it-secret-keep-it-safe"),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_expired_token_is_rejected() {
    let codec = codec();
    let token = codec
        .sign("user-1", TokenKind::Access, Duration::seconds(-60), SECRET, ACCESS_TOKEN_SUBJECT)
        .unwrap();

    assert_eq!(codec.verify(&token.value, SECRET), Err(TokenError::Expired));
}

#[test]
fn test_not_yet_valid_token_is_rejected() {
    let now = Utc::now().timestamp();
    let value = encode_with(Algorithm::HS256, &claims_at(now, now + 120, now + 600), SECRET);

    assert_eq!(codec().verify(&value, SECRET), Err(TokenError::NotYetValid));
}

#[test]
fn test_other_hmac_algorithms_are_accepted() {
    let now = Utc::now().timestamp();
    let claims = claims_at(now, now, now + 600);

    for alg in [Algorithm::HS384, Algorithm::HS512] {
        let value = encode_with(alg, &claims, SECRET);
        assert_eq!(codec().verify(&value, SECRET).unwrap(), claims);
    }
}

#[test]
fn test_foreign_issuer_is_rejected() {
    let now = Utc::now().timestamp();
    let mut claims = claims_at(now, now, now + 600);
    claims.iss = "someone-else".to_string();
    let value = encode_with(Algorithm::HS256, &claims, SECRET);

    assert_eq!(codec().verify(&value, SECRET), Err(TokenError::InvalidClaims));
}

#[test]
fn test_garbage_is_malformed() {
    let codec = codec();
    assert_eq!(codec.verify("not-a-token", SECRET), Err(TokenError::Malformed));
    assert_eq!(codec.verify("a.b.c", SECRET), Err(TokenError::Malformed));
}

#[test]
fn test_unsigned_token_is_rejected() {
    let now = Utc::now().timestamp();
    let value = encode_with(Algorithm::HS256, &claims_at(now, now, now + 600), SECRET);
    let mut parts: Vec<&str> = value.split('.').collect();
    // {"alg":"none","typ":"JWT"}
    parts[0] = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";
    let forged = format!("{}.{}.", parts[0], parts[1]);

    assert!(codec().verify(&forged, SECRET).is_err());
}

#[test]
fn test_non_hmac_header_is_unsupported() {
    let now = Utc::now().timestamp();
    let value = encode_with(Algorithm::HS256, &claims_at(now, now, now + 600), SECRET);
    let parts: Vec<&str> = value.split('.').collect();
    // {"alg":"RS256","typ":"JWT"}
    let forged = format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}.{}", parts[1], parts[2]);

    assert_eq!(codec().verify(&forged, SECRET), Err(TokenError::UnsupportedAlgorithm));
}
