//! Redis cache client implementation
//!
//! This module provides a Redis client with connection retry logic that
//! implements the [`CacheStore`] boundary used by the revocation list.
//! Connecting is retried at startup; each cache operation is issued once and
//! its failure is returned to the caller.

use std::time::Duration;

use async_trait::async_trait;
use authsvc_core::errors::DomainResult;
use authsvc_core::services::CacheStore;
use authsvc_shared::config::CacheConfig;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::InfrastructureError;

/// Redis cache client with a multiplexed connection
///
/// Clones share the same underlying connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
}

impl RedisClient {
    /// Connect to the configured Redis server
    ///
    /// # Example
    /// ```no_run
    /// use authsvc_shared::config::CacheConfig;
    /// use authsvc_infra::cache::RedisClient;
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let client = RedisClient::new(CacheConfig::new("localhost:6379")).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        Self::new_with_retry_delay(config, 100).await
    }

    /// Connect with a custom base delay between connection attempts
    pub async fn new_with_retry_delay(
        config: CacheConfig,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        info!(url = %config.masked_url(), "Creating Redis client");

        let client = Client::open(config.url().as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(&client, &config, retry_delay_ms).await?;
        info!("Redis client created successfully");

        Ok(Self { connection })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: &Client,
        config: &CacheConfig,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let max_attempts = config.connect_attempts.max(1);
        let timeout = Duration::from_secs(config.connection_timeout);
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let outcome = match tokio::time::timeout(timeout, client.get_multiplexed_async_connection()).await {
                Ok(result) => result.map_err(InfrastructureError::Cache),
                Err(_) => Err(InfrastructureError::Config(format!(
                    "Redis connection timed out after {}s",
                    config.connection_timeout
                ))),
            };

            match outcome {
                Ok(connection) => return Ok(connection),
                Err(e) if attempts < max_attempts => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_attempts, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 5 seconds
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl CacheStore for RedisClient {
    async fn set_with_expiry(&self, key: &str, value: &str, seconds: u64) -> DomainResult<()> {
        debug!("Setting key '{}' with expiry {}s", key, seconds);

        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| {
                error!("Failed to set key '{}': {}", key, e);
                InfrastructureError::Cache(e).into()
            })
    }

    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let mut conn = self.connection.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| {
                error!("Failed to get key '{}': {}", key, e);
                InfrastructureError::Cache(e).into()
            })
    }

    async fn health_check(&self) -> DomainResult<()> {
        let mut conn = self.connection.clone();
        let response = redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| {
                error!("Redis health check failed: {}", e);
                InfrastructureError::Cache(e)
            })?;

        if response == "PONG" {
            Ok(())
        } else {
            warn!("Redis health check returned unexpected response: {}", response);
            Err(InfrastructureError::Config(format!("unexpected PING response: {}", response)).into())
        }
    }
}
