//! In-memory credential store.
//!
//! [`InMemoryCredentialStore`] keeps users and token metadata in process
//! memory. It applies the same validation and uniqueness rules as the durable
//! store and is used by tests and single-process deployments.
//!
//! # Transactions
//!
//! A transaction works on a private snapshot of the state and publishes it on
//! commit. Transactions and standalone writes are serialized by a gate, so a
//! committed snapshot can never overwrite a concurrent write. Inside a
//! transaction body all work must go through the handle; calling a write on
//! the store itself would wait on the gate the transaction holds.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::entities::token::TokenMetadata;
use crate::domain::entities::user::{require_non_blank, User, UserUpdate};
use crate::errors::{DomainError, DomainResult};

use super::store::{CredentialStore, StoreTransaction};
use super::{TokenRepository, UserRepository};

#[derive(Debug, Clone, Default)]
struct State {
    users: HashMap<String, User>,
    tokens: HashMap<String, TokenMetadata>,
}

impl State {
    fn create_user(&mut self, user: &User) -> DomainResult<()> {
        user.validate()?;
        if self.users.contains_key(&user.id) {
            return Err(DomainError::already_exists("user"));
        }
        self.ensure_unique(&user.id, Some(&user.username), Some(&user.email))?;
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn update_user(&mut self, id: &str, update: &UserUpdate) -> DomainResult<()> {
        require_non_blank("user id", id)?;
        update.validate()?;
        if !self.users.contains_key(id) {
            return Err(DomainError::not_found("user"));
        }
        self.ensure_unique(id, update.username.as_deref(), update.email.as_deref())?;
        if let Some(user) = self.users.get_mut(id) {
            user.apply(update);
        }
        Ok(())
    }

    fn ensure_unique(&self, id: &str, username: Option<&str>, email: Option<&str>) -> DomainResult<()> {
        for other in self.users.values().filter(|u| u.id != id) {
            if username == Some(other.username.as_str()) {
                return Err(DomainError::already_exists("username"));
            }
            if email == Some(other.email.as_str()) {
                return Err(DomainError::already_exists("email"));
            }
        }
        Ok(())
    }

    fn find_user(&self, field: &str, key: &str, matches: impl Fn(&User) -> bool) -> DomainResult<User> {
        require_non_blank(field, key)?;
        self.users
            .values()
            .find(|u| matches(*u))
            .cloned()
            .ok_or_else(|| DomainError::not_found("user"))
    }

    fn create_token(&mut self, token: &TokenMetadata) -> DomainResult<()> {
        token.validate_at(Utc::now())?;
        if !self.users.contains_key(&token.user_id) {
            return Err(DomainError::not_found("user"));
        }
        if self.tokens.contains_key(&token.jti) {
            return Err(DomainError::already_exists("token"));
        }
        self.tokens.insert(token.jti.clone(), token.clone());
        Ok(())
    }

    fn token_by_jti(&self, jti: &str) -> DomainResult<TokenMetadata> {
        require_non_blank("jti", jti)?;
        self.tokens
            .get(jti)
            .cloned()
            .ok_or_else(|| DomainError::not_found("token"))
    }

    fn tokens_for_user(&self, user_id: &str) -> DomainResult<Vec<TokenMetadata>> {
        require_non_blank("user id", user_id)?;
        if !self.users.contains_key(user_id) {
            return Err(DomainError::not_found("user"));
        }
        let mut tokens: Vec<TokenMetadata> = self
            .tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tokens.sort_by(|a, b| a.issued_at.cmp(&b.issued_at).then_with(|| a.jti.cmp(&b.jti)));
        Ok(tokens)
    }
}

/// In-memory implementation of [`CredentialStore`]
///
/// Clones share the same underlying state.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    state: Arc<Mutex<State>>,
    gate: Arc<Mutex<()>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read<R>(&self, f: impl FnOnce(&State) -> R + Send) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    async fn write<R>(&self, f: impl FnOnce(&mut State) -> R + Send) -> R {
        let _gate = self.gate.lock().await;
        let mut state = self.state.lock().await;
        f(&mut state)
    }
}

/// Scoped handle of an [`InMemoryCredentialStore`] transaction
pub struct InMemoryTransaction {
    snapshot: Mutex<State>,
    shared: Arc<Mutex<State>>,
    _gate: OwnedMutexGuard<()>,
}

impl InMemoryTransaction {
    async fn read<R>(&self, f: impl FnOnce(&State) -> R + Send) -> R {
        let state = self.snapshot.lock().await;
        f(&state)
    }

    async fn write<R>(&self, f: impl FnOnce(&mut State) -> R + Send) -> R {
        let mut state = self.snapshot.lock().await;
        f(&mut state)
    }
}

macro_rules! state_backed_repositories {
    ($ty:ty) => {
        #[async_trait]
        impl UserRepository for $ty {
            async fn create_user(&self, user: &User) -> DomainResult<()> {
                self.write(|state| state.create_user(user)).await
            }

            async fn update_user(&self, id: &str, update: &UserUpdate) -> DomainResult<()> {
                self.write(|state| state.update_user(id, update)).await
            }

            async fn get_user_by_id(&self, id: &str) -> DomainResult<User> {
                self.read(|state| state.find_user("user id", id, |u| u.id == id)).await
            }

            async fn get_user_by_username(&self, username: &str) -> DomainResult<User> {
                self.read(|state| state.find_user("username", username, |u| u.username == username))
                    .await
            }

            async fn get_user_by_email(&self, email: &str) -> DomainResult<User> {
                self.read(|state| state.find_user("email", email, |u| u.email == email)).await
            }
        }

        #[async_trait]
        impl TokenRepository for $ty {
            async fn create_token(&self, token: &TokenMetadata) -> DomainResult<()> {
                self.write(|state| state.create_token(token)).await
            }

            async fn get_token_by_jti(&self, jti: &str) -> DomainResult<TokenMetadata> {
                self.read(|state| state.token_by_jti(jti)).await
            }

            async fn get_tokens_for_user(&self, user_id: &str) -> DomainResult<Vec<TokenMetadata>> {
                self.read(|state| state.tokens_for_user(user_id)).await
            }
        }
    };
}

state_backed_repositories!(InMemoryCredentialStore);
state_backed_repositories!(InMemoryTransaction);

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn commit(self) -> DomainResult<()> {
        let snapshot = self.snapshot.into_inner();
        *self.shared.lock().await = snapshot;
        Ok(())
    }

    async fn rollback(self) -> DomainResult<()> {
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> DomainResult<InMemoryTransaction> {
        let gate = self.gate.clone().lock_owned().await;
        let snapshot = self.state.lock().await.clone();
        Ok(InMemoryTransaction {
            snapshot: Mutex::new(snapshot),
            shared: self.state.clone(),
            _gate: gate,
        })
    }

    async fn health_check(&self) -> DomainResult<()> {
        Ok(())
    }
}
