//! # Infrastructure Layer
//!
//! Concrete backends for the authsvc token engine:
//! - **Database**: SQLite credential store using SQLx
//! - **Cache**: Redis client backing the revocation list
//!
//! Every backend failure leaves this crate as [`DomainError::Backend`] so
//! callers can tell transient infrastructure faults from domain rejections.

use authsvc_core::errors::DomainError;

/// Database module - SQLite implementations using SQLx
pub mod database;

/// Cache module - Redis client and operations
pub mod cache;

pub use cache::RedisClient;
pub use database::{DatabasePool, SqliteCredentialStore, SqliteTransaction};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::backend(err.to_string())
    }
}
