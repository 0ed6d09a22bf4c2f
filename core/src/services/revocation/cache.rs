//! Cache boundary for revocation markers

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::DomainResult;

/// Trait for key/value cache integration
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key`, expiring after `seconds`
    async fn set_with_expiry(&self, key: &str, value: &str, seconds: u64) -> DomainResult<()>;

    /// Read a value, `None` when the key is absent or expired
    async fn get(&self, key: &str) -> DomainResult<Option<String>>;

    /// Check that the cache is reachable
    async fn health_check(&self) -> DomainResult<()>;
}

/// Process-local [`CacheStore`] with per-entry expiry
///
/// Expiry is checked on read. Every write sweeps out entries that have
/// already expired, so markers that are never read again do not accumulate.
#[derive(Clone, Default)]
pub struct InMemoryCacheStore {
    entries: Arc<RwLock<HashMap<String, (String, Instant)>>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries that have not expired yet
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn set_with_expiry(&self, key: &str, value: &str, seconds: u64) -> DomainResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value.to_string(), now + Duration::from_secs(seconds)));
        Ok(())
    }

    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some((value, expires_at)) if *expires_at > now => return Ok(Some(value.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if matches!(entries.get(key), Some((_, expires_at)) if *expires_at <= now) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn health_check(&self) -> DomainResult<()> {
        Ok(())
    }
}
