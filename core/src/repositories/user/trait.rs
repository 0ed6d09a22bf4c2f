//! User repository trait defining the interface for user persistence.
//!
//! The trait is implemented both by credential stores and by the scoped
//! handles they hand out inside a transaction, so the same calls work in
//! and out of a transaction.

use async_trait::async_trait;

use crate::domain::entities::user::{User, UserUpdate};
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// # Example
/// ```no_run
/// # use authsvc_core::repositories::UserRepository;
/// # use authsvc_core::domain::entities::user::User;
/// # async fn example(repo: &impl UserRepository) -> Result<(), Box<dyn std::error::Error>> {
/// let user = User::new("alice", "alice@example.com", "$2b$12$...");
/// repo.create_user(&user).await?;
///
/// let found = repo.get_user_by_username("alice").await?;
/// assert_eq!(found.id, user.id);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user
    ///
    /// # Returns
    /// * `Ok(())` - User stored
    /// * `Err(DomainError::InvalidInput)` - A field is empty
    /// * `Err(DomainError::AlreadyExists)` - Username or email is taken
    async fn create_user(&self, user: &User) -> Result<(), DomainError>;

    /// Apply a partial update to an existing user
    ///
    /// # Returns
    /// * `Err(DomainError::InvalidInput)` - Empty id or no field supplied
    /// * `Err(DomainError::NotFound)` - No user with this id
    /// * `Err(DomainError::AlreadyExists)` - New username or email is taken
    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<(), DomainError>;

    /// Find a user by identifier, `NotFound` if absent
    async fn get_user_by_id(&self, id: &str) -> Result<User, DomainError>;

    /// Find a user by username, `NotFound` if absent
    async fn get_user_by_username(&self, username: &str) -> Result<User, DomainError>;

    /// Find a user by email, `NotFound` if absent
    async fn get_user_by_email(&self, email: &str) -> Result<User, DomainError>;
}
