//! Main session manager implementation

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use crate::domain::entities::token::{Claims, Token, TokenKind, TokenMetadata, TokenPair};
use crate::domain::entities::user::{LoginIdentifier, User};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::{CredentialStore, TokenRepository, UserRepository};
use crate::services::password::{BcryptPasswordHasher, PasswordHasher};
use crate::services::revocation::{CacheStore, RevocationList};
use crate::services::token::TokenCodec;

use super::config::SessionConfig;

/// Reachability of the backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthReport {
    pub store: bool,
    pub cache: bool,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.store && self.cache
    }
}

/// Orchestrates registration, login, verification, rotation and revocation
///
/// Every store and cache call is bounded by the configured backend timeout.
/// Backend failures are returned to the caller as they are; nothing is
/// retried or swallowed.
pub struct SessionManager<S, C, H = BcryptPasswordHasher>
where
    S: CredentialStore,
    C: CacheStore,
    H: PasswordHasher,
{
    /// Durable users and token metadata
    store: Arc<S>,
    /// Cache behind the revocation list, kept for health checks
    cache: Arc<C>,
    revocations: RevocationList<C>,
    codec: TokenCodec,
    hasher: Arc<H>,
    config: SessionConfig,
}

impl<S, C, H> SessionManager<S, C, H>
where
    S: CredentialStore,
    C: CacheStore,
    H: PasswordHasher,
{
    /// Create a new session manager
    ///
    /// # Arguments
    ///
    /// * `store` - Credential store for users and token metadata
    /// * `cache` - Cache backing the revocation list
    /// * `hasher` - Password hashing primitive
    /// * `config` - Token secrets, lifetimes and backend timeout
    pub fn new(store: Arc<S>, cache: Arc<C>, hasher: Arc<H>, config: SessionConfig) -> Self {
        let revocations = RevocationList::new(cache.clone(), &config.tokens);
        let codec = TokenCodec::new(config.tokens.issuer.clone());

        Self {
            store,
            cache,
            revocations,
            codec,
            hasher,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Register a new user
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - The persisted user
    /// * `Err(DomainError::InvalidInput)` - A field is blank
    /// * `Err(DomainError::AlreadyExists)` - Username or email is taken
    pub async fn register(&self, username: &str, email: &str, password: &str) -> DomainResult<User> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() || password.trim().is_empty() {
            return Err(DomainError::invalid_input(
                "username, email and password are required",
            ));
        }

        let password_hash = self.hash_password(password.to_string()).await?;
        let user = User::new(username, email, password_hash);

        self.bounded("create_user", self.store.create_user(&user)).await?;
        info!(user_id = %user.id, "user registered");

        Ok(user)
    }

    /// Authenticate with a username or email and a password
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Fresh refresh and access tokens
    /// * `Err(DomainError::InvalidInput)` - Empty password
    /// * `Err(DomainError::NotFound)` - Unknown user
    /// * `Err(DomainError::InvalidPassword)` - Password mismatch
    pub async fn login(&self, identifier: &LoginIdentifier, password: &str) -> DomainResult<TokenPair> {
        if password.is_empty() {
            return Err(DomainError::invalid_input("password is required"));
        }

        let user = match identifier {
            LoginIdentifier::Username(username) => {
                self.bounded("get_user_by_username", self.store.get_user_by_username(username))
                    .await
            }
            LoginIdentifier::Email(email) => {
                self.bounded("get_user_by_email", self.store.get_user_by_email(email))
                    .await
            }
        }
        .map_err(|e| {
            if matches!(e, DomainError::NotFound { .. }) {
                warn!("login attempt for unknown user");
            }
            e
        })?;

        if !self.verify_password(password.to_string(), user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(DomainError::InvalidPassword);
        }

        let pair = self.issue_pair(&user.id).await?;
        info!(user_id = %user.id, refresh_jti = %pair.refresh.jti, "user logged in");

        Ok(pair)
    }

    /// Verify a token of `kind` and return its owner
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - The token is authentic, live and not revoked
    /// * `Err(DomainError::InvalidInput)` - Empty value or a kind that is never minted
    /// * `Err(DomainError::Token)` - The token must be rejected
    pub async fn verify(&self, value: &str, kind: TokenKind) -> DomainResult<User> {
        let (_, user) = self.authenticate(value, kind).await?;
        Ok(user)
    }

    /// Rotate a refresh token
    ///
    /// A new pair is minted and persisted before the presented refresh token
    /// is revoked, so a failure never leaves the user without a usable token.
    /// Presenting the same refresh token again fails.
    pub async fn refresh(&self, value: &str) -> DomainResult<TokenPair> {
        let (claims, user) = self.authenticate(value, TokenKind::Refresh).await?;

        let pair = self.issue_pair(&user.id).await?;
        self.revoke_jti(&claims.jti, TokenKind::Refresh, None).await?;

        info!(
            user_id = %user.id,
            old_jti = %claims.jti,
            new_jti = %pair.refresh.jti,
            "refresh token rotated"
        );
        Ok(pair)
    }

    /// Revoke a presented access token, returning the revocation time
    pub async fn revoke_access(&self, value: &str) -> DomainResult<DateTime<Utc>> {
        self.revoke_presented(value, TokenKind::Access).await
    }

    /// Revoke a presented refresh token, returning the revocation time
    pub async fn revoke_refresh(&self, value: &str) -> DomainResult<DateTime<Utc>> {
        self.revoke_presented(value, TokenKind::Refresh).await
    }

    /// Revoke every outstanding token of a user
    ///
    /// # Returns
    ///
    /// * `Ok(DateTime)` - Revocation time
    /// * `Err(DomainError::NotFound)` - The user does not exist
    pub async fn revoke_all(&self, user_id: &str) -> DomainResult<DateTime<Utc>> {
        if user_id.trim().is_empty() {
            return Err(DomainError::invalid_input("user id is required"));
        }

        let tokens = self.tokens_for_user(user_id).await?;
        let now = Utc::now();

        let mut revoked = 0usize;
        for token in tokens.iter().filter(|t| t.is_live_at(now)) {
            self.revoke_jti(&token.jti, token.kind, Some(token.expires_at - now))
                .await?;
            revoked += 1;
        }

        info!(user_id, revoked, "all user tokens revoked");
        Ok(now)
    }

    /// Issued-token records of a user, oldest first
    pub async fn tokens_for_user(&self, user_id: &str) -> DomainResult<Vec<TokenMetadata>> {
        self.bounded("get_tokens_for_user", self.store.get_tokens_for_user(user_id))
            .await
    }

    /// Probe both backends
    pub async fn health(&self) -> HealthReport {
        let store = self
            .bounded("store_health_check", self.store.health_check())
            .await
            .is_ok();
        let cache = self
            .bounded("cache_health_check", self.cache.health_check())
            .await
            .is_ok();

        HealthReport { store, cache }
    }

    /// Verify signature, subject, revocation and owner of a presented token
    async fn authenticate(&self, value: &str, kind: TokenKind) -> DomainResult<(Claims, User)> {
        if value.trim().is_empty() {
            return Err(DomainError::invalid_input("token value is required"));
        }
        let (secret, subject) = self.signing_params(kind)?;

        let claims = self.codec.verify(value, secret).map_err(|e| {
            warn!(%kind, reason = %e, "token rejected");
            e
        })?;

        if claims.sub != subject {
            warn!(%kind, jti = %claims.jti, "token rejected: subject does not match kind");
            return Err(TokenError::WrongSubject.into());
        }

        if self
            .bounded("find_revocation", self.revocations.find(&claims.jti))
            .await?
        {
            warn!(%kind, jti = %claims.jti, "token rejected: revoked");
            return Err(TokenError::Revoked.into());
        }

        let user = match self
            .bounded("get_user_by_id", self.store.get_user_by_id(&claims.user_id))
            .await
        {
            Ok(user) => user,
            Err(DomainError::NotFound { .. }) => {
                warn!(jti = %claims.jti, "token rejected: owner does not exist");
                return Err(TokenError::InvalidClaims.into());
            }
            Err(e) => return Err(e),
        };

        debug!(%kind, jti = %claims.jti, user_id = %user.id, "token verified");
        Ok((claims, user))
    }

    async fn revoke_presented(&self, value: &str, kind: TokenKind) -> DomainResult<DateTime<Utc>> {
        let (claims, user) = self.authenticate(value, kind).await?;
        self.revoke_jti(&claims.jti, kind, None).await?;

        info!(user_id = %user.id, jti = %claims.jti, %kind, "token revoked");
        Ok(Utc::now())
    }

    /// Write a revocation marker covering the rest of the token's life
    ///
    /// Active kinds use their full configured lifetime, which is never shorter
    /// than what remains of a token.
    async fn revoke_jti(&self, jti: &str, kind: TokenKind, remaining: Option<Duration>) -> DomainResult<()> {
        let lifetime = self.config.tokens.duration_for(kind);
        let ttl = match remaining {
            Some(remaining) if remaining > lifetime => remaining,
            _ => lifetime,
        };

        self.bounded("create_revocation", self.revocations.create(jti, kind, ttl))
            .await
    }

    /// Mint a refresh and access token and record both in one transaction
    async fn issue_pair(&self, user_id: &str) -> DomainResult<TokenPair> {
        let refresh = self.mint(user_id, TokenKind::Refresh)?;
        let access = self.mint(user_id, TokenKind::Access)?;

        let records = [refresh.metadata(user_id), access.metadata(user_id)];
        self.bounded(
            "record_tokens",
            self.store.execute_transaction(move |tx| {
                Box::pin(async move {
                    for record in &records {
                        tx.create_token(record).await?;
                    }
                    Ok(())
                })
            }),
        )
        .await?;

        Ok(TokenPair::new(refresh, access))
    }

    fn mint(&self, user_id: &str, kind: TokenKind) -> DomainResult<Token> {
        let (secret, subject) = self.signing_params(kind)?;
        self.codec
            .sign(user_id, kind, self.config.tokens.duration_for(kind), secret, subject)
    }

    /// Secret and subject label for a kind that is actually minted
    fn signing_params(&self, kind: TokenKind) -> DomainResult<(&str, &'static str)> {
        match (self.config.tokens.secret_for(kind), kind.subject()) {
            (Some(secret), Some(subject)) => Ok((secret, subject)),
            _ => Err(DomainError::invalid_input(format!(
                "{} tokens are not supported",
                kind
            ))),
        }
    }

    async fn hash_password(&self, password: String) -> DomainResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::backend(format!("password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: String) -> DomainResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::backend(format!("password verification task failed: {}", e)))?
    }

    /// Run a backend call under the configured deadline
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        match tokio::time::timeout(self.config.backend_timeout, call).await {
            Ok(Err(e)) if e.is_retryable() => {
                error!(operation, error = %e, "backend call failed");
                Err(e)
            }
            Ok(result) => result,
            Err(_) => {
                error!(operation, timeout = ?self.config.backend_timeout, "backend deadline exceeded");
                Err(DomainError::DeadlineExceeded {
                    operation: operation.to_string(),
                })
            }
        }
    }
}
