//! SQLite implementation of [`CredentialStore`].
//!
//! Uniqueness is checked before inserting a user, but the table constraints
//! stay authoritative: constraint failures from a lost race are mapped onto
//! the same errors the in-memory store returns.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::sync::{Mutex, MutexGuard};

use authsvc_core::domain::entities::token::TokenMetadata;
use authsvc_core::domain::entities::user::{require_non_blank, User, UserUpdate};
use authsvc_core::errors::{DomainError, DomainResult};
use authsvc_core::repositories::{CredentialStore, StoreTransaction, TokenRepository, UserRepository};

use super::queries::{self, read_error, UserKey};
use crate::database::DatabasePool;

/// Durable credential store over a SQLite pool
#[derive(Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn from_database(database: &DatabasePool) -> Self {
        Self::new(database.get_pool().clone())
    }

    async fn connection(&self) -> DomainResult<PoolConnection<Sqlite>> {
        self.pool.acquire().await.map_err(read_error)
    }
}

/// Scoped handle of an open SQLite transaction
///
/// Dropping the handle without committing rolls the transaction back.
pub struct SqliteTransaction {
    tx: Mutex<Transaction<'static, Sqlite>>,
}

impl SqliteTransaction {
    async fn connection(&self) -> DomainResult<MutexGuard<'_, Transaction<'static, Sqlite>>> {
        Ok(self.tx.lock().await)
    }
}

macro_rules! sqlite_repositories {
    ($ty:ty) => {
        #[async_trait]
        impl UserRepository for $ty {
            async fn create_user(&self, user: &User) -> DomainResult<()> {
                user.validate()?;
                let mut conn = self.connection().await?;
                if let Some(column) =
                    queries::taken_identity(&mut conn, &user.username, &user.email).await?
                {
                    return Err(DomainError::already_exists(column));
                }
                queries::insert_user(&mut conn, user).await
            }

            async fn update_user(&self, id: &str, update: &UserUpdate) -> DomainResult<()> {
                require_non_blank("user id", id)?;
                update.validate()?;
                let mut conn = self.connection().await?;
                queries::update_user(&mut conn, id, update).await
            }

            async fn get_user_by_id(&self, id: &str) -> DomainResult<User> {
                require_non_blank("user id", id)?;
                let mut conn = self.connection().await?;
                queries::find_user(&mut conn, UserKey::Id, id).await
            }

            async fn get_user_by_username(&self, username: &str) -> DomainResult<User> {
                require_non_blank("username", username)?;
                let mut conn = self.connection().await?;
                queries::find_user(&mut conn, UserKey::Username, username).await
            }

            async fn get_user_by_email(&self, email: &str) -> DomainResult<User> {
                require_non_blank("email", email)?;
                let mut conn = self.connection().await?;
                queries::find_user(&mut conn, UserKey::Email, email).await
            }
        }

        #[async_trait]
        impl TokenRepository for $ty {
            async fn create_token(&self, token: &TokenMetadata) -> DomainResult<()> {
                token.validate_at(Utc::now())?;
                let mut conn = self.connection().await?;
                queries::insert_token(&mut conn, token).await
            }

            async fn get_token_by_jti(&self, jti: &str) -> DomainResult<TokenMetadata> {
                require_non_blank("jti", jti)?;
                let mut conn = self.connection().await?;
                queries::find_token(&mut conn, jti).await
            }

            async fn get_tokens_for_user(&self, user_id: &str) -> DomainResult<Vec<TokenMetadata>> {
                require_non_blank("user id", user_id)?;
                let mut conn = self.connection().await?;
                if !queries::user_exists(&mut conn, user_id).await? {
                    return Err(DomainError::not_found("user"));
                }
                queries::tokens_for_user(&mut conn, user_id).await
            }
        }
    };
}

sqlite_repositories!(SqliteCredentialStore);
sqlite_repositories!(SqliteTransaction);

#[async_trait]
impl StoreTransaction for SqliteTransaction {
    async fn commit(self) -> DomainResult<()> {
        self.tx
            .into_inner()
            .commit()
            .await
            .map_err(|e| DomainError::backend(format!("commit failed: {}", e)))
    }

    async fn rollback(self) -> DomainResult<()> {
        self.tx
            .into_inner()
            .rollback()
            .await
            .map_err(|e| DomainError::backend(format!("rollback failed: {}", e)))
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    type Transaction = SqliteTransaction;

    async fn begin(&self) -> DomainResult<SqliteTransaction> {
        let tx = self.pool.begin().await.map_err(read_error)?;
        Ok(SqliteTransaction { tx: Mutex::new(tx) })
    }

    async fn health_check(&self) -> DomainResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(read_error)?;
        Ok(())
    }
}
