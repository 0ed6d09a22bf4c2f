//! Shared setup for the HTTP integration tests

use std::sync::Arc;
use std::time::Duration as StdDuration;

use actix_web::{test, web};
use async_trait::async_trait;
use chrono::Duration;

use authsvc_api::AppState;
use authsvc_core::errors::{DomainError, DomainResult};
use authsvc_core::repositories::InMemoryCredentialStore;
use authsvc_core::services::{
    BcryptPasswordHasher, CacheStore, InMemoryCacheStore, SessionConfig, SessionManager,
    TokenServiceConfig,
};

pub fn session_config() -> SessionConfig {
    SessionConfig::new(TokenServiceConfig {
        issuer: "auth-service-1".to_string(),
        access_secret: "is-it-secret-?-is-it-safe-?".to_string(),
        refresh_secret: "keep-it-secret-keep-it-safe".to_string(),
        access_token_expiry: Duration::seconds(300),
        refresh_token_expiry: Duration::seconds(604_800),
    })
    .with_backend_timeout(StdDuration::from_secs(1))
}

pub fn state_with_cache<C: CacheStore>(cache: C) -> web::Data<AppState<InMemoryCredentialStore, C>> {
    let session = SessionManager::new(
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(cache),
        Arc::new(BcryptPasswordHasher::with_cost(4)),
        session_config(),
    );
    web::Data::new(AppState::new(session))
}

pub fn state() -> web::Data<AppState<InMemoryCredentialStore, InMemoryCacheStore>> {
    state_with_cache(InMemoryCacheStore::new())
}

/// Cache that refuses every call
pub struct DownCache;

#[async_trait]
impl CacheStore for DownCache {
    async fn set_with_expiry(&self, _key: &str, _value: &str, _seconds: u64) -> DomainResult<()> {
        Err(DomainError::backend("connection refused"))
    }

    async fn get(&self, _key: &str) -> DomainResult<Option<String>> {
        Err(DomainError::backend("connection refused"))
    }

    async fn health_check(&self) -> DomainResult<()> {
        Err(DomainError::backend("connection refused"))
    }
}

/// POST request carrying a JSON body
pub fn post(uri: &str, body: serde_json::Value) -> test::TestRequest {
    test::TestRequest::post().uri(uri).set_json(body)
}
