//! One-way password hashing

use crate::errors::{DomainError, DomainResult};

/// Opaque one-way password hashing primitive
pub trait PasswordHasher: Send + Sync + 'static {
    fn hash(&self, password: &str) -> DomainResult<String>;

    /// Compare a plaintext password with a stored hash
    fn verify(&self, password: &str, hash: &str) -> DomainResult<bool>;
}

/// Salted bcrypt hashing
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Use a custom work factor; low costs are only meant for tests
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> DomainResult<String> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| DomainError::backend(format!("password hashing failed: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> DomainResult<bool> {
        bcrypt::verify(password, hash)
            .map_err(|e| DomainError::backend(format!("password verification failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = BcryptPasswordHasher::with_cost(4);
        let hash = hasher.hash("pa55word").unwrap();

        assert_ne!(hash, "pa55word");
        assert!(hasher.verify("pa55word", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = BcryptPasswordHasher::with_cost(4);
        assert_ne!(hasher.hash("pa55word").unwrap(), hasher.hash("pa55word").unwrap());
    }

    #[test]
    fn test_corrupt_hash_is_a_backend_error() {
        let hasher = BcryptPasswordHasher::with_cost(4);
        assert!(matches!(
            hasher.verify("pa55word", "not-a-bcrypt-hash"),
            Err(DomainError::Backend { .. })
        ));
    }
}
