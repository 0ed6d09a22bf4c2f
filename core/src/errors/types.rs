//! Token and revocation error types

use thiserror::Error;

/// Reasons a presented token is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token: malformed")]
    Malformed,

    #[error("Invalid token: unsupported signing algorithm")]
    UnsupportedAlgorithm,

    #[error("Invalid token: signature mismatch")]
    InvalidSignature,

    #[error("Invalid token: expired")]
    Expired,

    #[error("Invalid token: not yet valid")]
    NotYetValid,

    #[error("Invalid token: revoked")]
    Revoked,

    #[error("Invalid token: subject does not match token kind")]
    WrongSubject,

    #[error("Invalid token: invalid claims")]
    InvalidClaims,
}

/// Revocation list rejections
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevocationError {
    #[error("Revocation key must not be empty")]
    InvalidKey,

    #[error("Revocation ttl of {requested_secs}s is shorter than the token lifetime of {minimum_secs}s")]
    InvalidDuration {
        requested_secs: i64,
        minimum_secs: i64,
    },

    #[error("Revocation entry {key} holds a non-numeric value")]
    CorruptEntry { key: String },
}
