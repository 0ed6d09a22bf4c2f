//! Transactional credential store.
//!
//! A [`CredentialStore`] is the durable home of users and issued-token
//! metadata. Work that must land atomically runs through
//! [`CredentialStore::execute_transaction`]: the body receives a scoped handle
//! implementing the same repository traits, the unit commits when the body
//! succeeds and rolls back when it fails. Dropping a transaction without
//! committing discards its writes.

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::errors::{DomainError, DomainResult};

use super::{TokenRepository, UserRepository};

/// Scoped handle for one atomic unit of work
#[async_trait]
pub trait StoreTransaction: UserRepository + TokenRepository + Sized {
    /// Make every write of this transaction visible
    async fn commit(self) -> DomainResult<()>;

    /// Discard every write of this transaction
    async fn rollback(self) -> DomainResult<()>;
}

/// Durable user and token store with a scoped-transaction primitive
#[async_trait]
pub trait CredentialStore: UserRepository + TokenRepository {
    type Transaction: StoreTransaction;

    /// Open a new transaction
    async fn begin(&self) -> DomainResult<Self::Transaction>;

    /// Cheap liveness probe of the underlying engine
    async fn health_check(&self) -> DomainResult<()>;

    /// Run `body` as one atomic unit
    ///
    /// Returns the body's value after a successful commit, or the body's
    /// error after rolling back. When the rollback itself fails both causes
    /// are reported through [`DomainError::TransactionRollbackFailed`].
    ///
    /// # Example
    /// ```no_run
    /// # use authsvc_core::repositories::{CredentialStore, TokenRepository};
    /// # use authsvc_core::domain::entities::token::TokenMetadata;
    /// # async fn example<S: CredentialStore>(store: &S, a: TokenMetadata, b: TokenMetadata) -> authsvc_core::errors::DomainResult<()> {
    /// store
    ///     .execute_transaction(move |tx| {
    ///         Box::pin(async move {
    ///             tx.create_token(&a).await?;
    ///             tx.create_token(&b).await
    ///         })
    ///     })
    ///     .await
    /// # }
    /// ```
    async fn execute_transaction<T, F>(&self, body: F) -> DomainResult<T>
    where
        T: Send,
        F: for<'s> FnOnce(&'s Self::Transaction) -> BoxFuture<'s, DomainResult<T>> + Send,
    {
        let tx = self.begin().await?;
        let outcome = body(&tx).await;

        match outcome {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => match tx.rollback().await {
                Ok(()) => {
                    tracing::debug!(error = %err, "transaction rolled back");
                    Err(err)
                }
                Err(rollback) => {
                    tracing::error!(error = %err, rollback_error = %rollback, "transaction rollback failed");
                    Err(DomainError::TransactionRollbackFailed {
                        source: Box::new(err),
                        rollback: rollback.to_string(),
                    })
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::domain::entities::token::TokenMetadata;
    use crate::domain::entities::user::{User, UserUpdate};

    /// Store whose transactions fail on demand
    #[derive(Default)]
    struct ScriptedStore {
        fail_rollback: bool,
        commits: Arc<AtomicUsize>,
        rollbacks: Arc<AtomicUsize>,
    }

    struct ScriptedTransaction {
        fail_rollback: bool,
        commits: Arc<AtomicUsize>,
        rollbacks: Arc<AtomicUsize>,
    }

    macro_rules! unreachable_repositories {
        ($ty:ty) => {
            #[async_trait]
            impl UserRepository for $ty {
                async fn create_user(&self, _user: &User) -> DomainResult<()> {
                    Err(DomainError::already_exists("user"))
                }
                async fn update_user(&self, _id: &str, _update: &UserUpdate) -> DomainResult<()> {
                    Ok(())
                }
                async fn get_user_by_id(&self, _id: &str) -> DomainResult<User> {
                    Err(DomainError::not_found("user"))
                }
                async fn get_user_by_username(&self, _username: &str) -> DomainResult<User> {
                    Err(DomainError::not_found("user"))
                }
                async fn get_user_by_email(&self, _email: &str) -> DomainResult<User> {
                    Err(DomainError::not_found("user"))
                }
            }

            #[async_trait]
            impl TokenRepository for $ty {
                async fn create_token(&self, _token: &TokenMetadata) -> DomainResult<()> {
                    Ok(())
                }
                async fn get_token_by_jti(&self, _jti: &str) -> DomainResult<TokenMetadata> {
                    Err(DomainError::not_found("token"))
                }
                async fn get_tokens_for_user(&self, _user_id: &str) -> DomainResult<Vec<TokenMetadata>> {
                    Ok(vec![])
                }
            }
        };
    }

    unreachable_repositories!(ScriptedStore);
    unreachable_repositories!(ScriptedTransaction);

    #[async_trait]
    impl StoreTransaction for ScriptedTransaction {
        async fn commit(self) -> DomainResult<()> {
            self.commits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn rollback(self) -> DomainResult<()> {
            self.rollbacks.fetch_add(1, Ordering::SeqCst);
            if self.fail_rollback {
                return Err(DomainError::backend("connection lost"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CredentialStore for ScriptedStore {
        type Transaction = ScriptedTransaction;

        async fn begin(&self) -> DomainResult<ScriptedTransaction> {
            Ok(ScriptedTransaction {
                fail_rollback: self.fail_rollback,
                commits: self.commits.clone(),
                rollbacks: self.rollbacks.clone(),
            })
        }

        async fn health_check(&self) -> DomainResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_successful_body_commits() {
        let store = ScriptedStore::default();

        let value = store
            .execute_transaction(|_tx| Box::pin(async { Ok(42) }))
            .await
            .unwrap();

        assert_eq!(value, 42);
        assert_eq!(store.commits.load(Ordering::SeqCst), 1);
        assert_eq!(store.rollbacks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_body_rolls_back_and_returns_its_error() {
        let store = ScriptedStore::default();
        let user = User::new("alice", "alice@example.com", "hash");

        let err = store
            .execute_transaction(move |tx| Box::pin(async move { tx.create_user(&user).await }))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::AlreadyExists { .. }));
        assert_eq!(store.commits.load(Ordering::SeqCst), 0);
        assert_eq!(store.rollbacks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_rollback_surfaces_both_errors() {
        let store = ScriptedStore {
            fail_rollback: true,
            ..Default::default()
        };

        let err = store
            .execute_transaction(|tx| Box::pin(async move { tx.get_user_by_id("missing").await }))
            .await
            .unwrap_err();

        match err {
            DomainError::TransactionRollbackFailed { source, rollback } => {
                assert!(matches!(*source, DomainError::NotFound { .. }));
                assert!(rollback.contains("connection lost"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
