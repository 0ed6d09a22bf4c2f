//! Token repository trait defining the interface for issued-token metadata.

use async_trait::async_trait;

use crate::domain::entities::token::TokenMetadata;
use crate::errors::DomainError;

/// Repository trait for issued-token metadata
///
/// # Security Considerations
/// - Only the SHA-256 digest of a signed value is ever stored
/// - Revocation lives in the revocation cache, not here
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Record an issued token
    ///
    /// # Returns
    /// * `Err(DomainError::InvalidInput)` - Empty field or issued/expiry window does not contain now
    /// * `Err(DomainError::NotFound)` - The owning user does not exist
    /// * `Err(DomainError::AlreadyExists)` - The jti is already recorded
    async fn create_token(&self, token: &TokenMetadata) -> Result<(), DomainError>;

    /// Find a token record by its jti, `NotFound` if absent
    async fn get_token_by_jti(&self, jti: &str) -> Result<TokenMetadata, DomainError>;

    /// All token records for a user, ordered by issue time then jti
    ///
    /// # Returns
    /// * `Ok(vec![])` - The user exists but holds no tokens
    /// * `Err(DomainError::NotFound)` - The user does not exist
    async fn get_tokens_for_user(&self, user_id: &str) -> Result<Vec<TokenMetadata>, DomainError>;
}
