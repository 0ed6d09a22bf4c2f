//! Domain-specific error types and error handling.

mod types;

pub use types::{RevocationError, TokenError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Resource already exists: {resource}")]
    AlreadyExists { resource: String },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Invalid password")]
    InvalidPassword,

    #[error(transparent)]
    Revocation(#[from] RevocationError),

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Deadline exceeded during {operation}")]
    DeadlineExceeded { operation: String },

    #[error("{source}; rollback also failed: {rollback}")]
    TransactionRollbackFailed {
        source: Box<DomainError>,
        rollback: String,
    },
}

impl DomainError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn already_exists(resource: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource: resource.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// True for failures of an external backend
    ///
    /// Callers may retry these; the engine itself never does.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::Backend { .. }
                | DomainError::DeadlineExceeded { .. }
                | DomainError::TransactionRollbackFailed { .. }
        )
    }

    /// True when a presented token must be rejected
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, DomainError::Token(_))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
