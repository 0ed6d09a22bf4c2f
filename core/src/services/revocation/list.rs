//! Revocation list backed by a [`CacheStore`]

use std::sync::Arc;

use chrono::Duration;

use crate::domain::entities::token::TokenKind;
use crate::errors::{DomainResult, RevocationError};
use crate::services::token::TokenServiceConfig;

use super::cache::CacheStore;

/// Key prefix of revocation markers
pub const REVOKED_KEY_PREFIX: &str = "revoked:";

const REVOKED_MARKER: &str = "1";

/// Records revoked jtis with a lifetime at least as long as the token's
///
/// A jti moves from unknown to revoked on [`create`](Self::create) and falls
/// back to unknown when the marker expires, by which time the token itself
/// has expired.
pub struct RevocationList<C: CacheStore> {
    cache: Arc<C>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl<C: CacheStore> RevocationList<C> {
    pub fn new(cache: Arc<C>, config: &TokenServiceConfig) -> Self {
        Self {
            cache,
            access_ttl: config.duration_for(TokenKind::Access),
            refresh_ttl: config.duration_for(TokenKind::Refresh),
        }
    }

    /// Shortest ttl accepted for a token of `kind`
    pub fn minimum_ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
            _ => Duration::zero(),
        }
    }

    /// Mark `jti` as revoked for `ttl`
    ///
    /// The sign of `ttl` is ignored. It is stored in whole seconds, rounded up.
    pub async fn create(&self, jti: &str, kind: TokenKind, ttl: Duration) -> DomainResult<()> {
        if jti.is_empty() {
            return Err(RevocationError::InvalidKey.into());
        }

        let ttl = ttl.abs();
        let minimum = self.minimum_ttl(kind);
        if ttl < minimum {
            return Err(RevocationError::InvalidDuration {
                requested_secs: ttl.num_seconds(),
                minimum_secs: minimum.num_seconds(),
            }
            .into());
        }

        self.cache
            .set_with_expiry(&revocation_key(jti), REVOKED_MARKER, whole_seconds(ttl))
            .await?;
        tracing::debug!(jti, %kind, ttl_secs = whole_seconds(ttl), "revocation marker written");
        Ok(())
    }

    /// Whether `jti` is currently revoked
    ///
    /// A missing marker means "not known to be revoked". A marker that does
    /// not parse as an integer is reported as an error.
    pub async fn find(&self, jti: &str) -> DomainResult<bool> {
        if jti.is_empty() {
            return Err(RevocationError::InvalidKey.into());
        }

        let key = revocation_key(jti);
        match self.cache.get(&key).await? {
            None => Ok(false),
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map(|flag| flag > 0)
                .map_err(|_| RevocationError::CorruptEntry { key }.into()),
        }
    }
}

fn revocation_key(jti: &str) -> String {
    format!("{}{}", REVOKED_KEY_PREFIX, jti)
}

/// Seconds rounded up, never zero
fn whole_seconds(ttl: Duration) -> u64 {
    let millis = ttl.num_milliseconds().max(0) as u64;
    millis.div_ceil(1000).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DomainError;
    use crate::services::revocation::InMemoryCacheStore;

    fn config() -> TokenServiceConfig {
        TokenServiceConfig {
            issuer: "auth-service-1".to_string(),
            access_secret: "a".to_string(),
            refresh_secret: "r".to_string(),
            access_token_expiry: Duration::seconds(300),
            refresh_token_expiry: Duration::seconds(604_800),
        }
    }

    fn list() -> (Arc<InMemoryCacheStore>, RevocationList<InMemoryCacheStore>) {
        let cache = Arc::new(InMemoryCacheStore::new());
        let list = RevocationList::new(cache.clone(), &config());
        (cache, list)
    }

    #[tokio::test]
    async fn test_unknown_jti_is_not_revoked() {
        let (_, list) = list();
        assert!(!list.find("never-seen").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let (cache, list) = list();
        list.create("jti-1", TokenKind::Access, Duration::seconds(300))
            .await
            .unwrap();

        assert!(list.find("jti-1").await.unwrap());
        assert_eq!(cache.get("revoked:jti-1").await.unwrap(), Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_empty_jti_is_rejected() {
        let (_, list) = list();
        let err = list
            .create("", TokenKind::Access, Duration::seconds(300))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Revocation(RevocationError::InvalidKey)));
    }

    #[tokio::test]
    async fn test_ttl_shorter_than_lifetime_is_rejected() {
        let (_, list) = list();
        let err = list
            .create("jti-1", TokenKind::Refresh, Duration::seconds(300))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Revocation(RevocationError::InvalidDuration { .. })
        ));
        assert!(!list.find("jti-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_negative_ttl_uses_magnitude() {
        let (_, list) = list();
        list.create("jti-1", TokenKind::Access, Duration::seconds(-300))
            .await
            .unwrap();
        assert!(list.find("jti-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_kinds_without_lifetime_accept_any_ttl() {
        let (_, list) = list();
        list.create("jti-1", TokenKind::PasswordReset, Duration::milliseconds(1500))
            .await
            .unwrap();
        assert!(list.find("jti-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_garbage_marker_is_an_error() {
        let (cache, list) = list();
        cache.set_with_expiry("revoked:jti-1", "yes", 60).await.unwrap();

        let err = list.find("jti-1").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Revocation(RevocationError::CorruptEntry { .. })
        ));
    }

    #[tokio::test]
    async fn test_zero_marker_is_not_revoked() {
        let (cache, list) = list();
        cache.set_with_expiry("revoked:jti-1", "0", 60).await.unwrap();
        assert!(!list.find("jti-1").await.unwrap());
    }

    #[test]
    fn test_whole_seconds_rounds_up() {
        assert_eq!(whole_seconds(Duration::milliseconds(1500)), 2);
        assert_eq!(whole_seconds(Duration::seconds(300)), 300);
        assert_eq!(whole_seconds(Duration::zero()), 1);
    }
}
