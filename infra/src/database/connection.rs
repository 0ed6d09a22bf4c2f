//! Database connection pool management
//!
//! This module provides database connection pooling using SQLx with SQLite,
//! including pool configuration, schema migrations and health checks.

use std::str::FromStr;
use std::time::Duration;

use authsvc_shared::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::log::LevelFilter;

use crate::InfrastructureError;

/// Database connection pool wrapper
///
/// Manages the SQLite connection pool with configurable settings
/// for connection limits, timeouts, and health checks.
#[derive(Clone)]
pub struct DatabasePool {
    /// SQLx SQLite connection pool
    pool: SqlitePool,
}

impl DatabasePool {
    /// Create a new database connection pool
    ///
    /// An in-memory URL gets a single long-lived connection, since every
    /// SQLite connection to `:memory:` opens its own private database.
    ///
    /// # Example
    /// ```no_run
    /// use authsvc_shared::config::DatabaseConfig;
    /// use authsvc_infra::database::DatabasePool;
    ///
    /// async fn create_pool() -> Result<DatabasePool, Box<dyn std::error::Error>> {
    ///     let pool = DatabasePool::new(DatabaseConfig::new("sqlite://authsvc.db?mode=rwc")).await?;
    ///     pool.run_migrations().await?;
    ///     Ok(pool)
    /// }
    /// ```
    pub async fn new(config: DatabaseConfig) -> Result<Self, InfrastructureError> {
        if config.auth_token.is_some() {
            tracing::warn!("DATABASE_AUTH_TOKEN is set but ignored by the embedded SQLite driver");
        }

        let connect_options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| InfrastructureError::Config(format!("Invalid database URL: {}", e)))?
            .foreign_keys(true)
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(
                LevelFilter::Warn,
                Duration::from_millis(config.slow_query_threshold),
            );

        let in_memory = config.is_in_memory();
        let max_connections = if in_memory { 1 } else { config.max_connections.max(1) };
        tracing::info!(max_connections, in_memory, "Creating database connection pool");

        let mut options = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.connect_timeout));
        options = if in_memory {
            options.idle_timeout(None).max_lifetime(None)
        } else {
            options
                .idle_timeout(Duration::from_secs(config.idle_timeout))
                .max_lifetime(Duration::from_secs(1800))
        };

        let pool = options.connect_with(connect_options).await.map_err(|e| {
            tracing::error!("Failed to create database pool: {}", e);
            InfrastructureError::Database(e)
        })?;

        tracing::info!("Database connection pool created successfully");
        Ok(Self { pool })
    }

    /// Get a reference to the underlying SQLx pool
    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply the bundled schema migrations
    pub async fn run_migrations(&self) -> Result<(), InfrastructureError> {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), InfrastructureError> {
        tracing::debug!("Performing database health check");

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                InfrastructureError::Database(e)
            })?;

        Ok(())
    }

    /// Close all connections in the pool
    ///
    /// This should be called during application shutdown.
    pub async fn close(&self) {
        tracing::info!("Closing database connection pool");
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_creation_with_invalid_url() {
        let config = DatabaseConfig::new("sqlite:///no/such/dir/authsvc.db").with_max_connections(1);
        let result = DatabasePool::new(config).await;
        assert!(matches!(result, Err(InfrastructureError::Database(_))));
    }

    #[tokio::test]
    async fn test_in_memory_pool_is_healthy() {
        let pool = DatabasePool::new(DatabaseConfig::new("sqlite::memory:"))
            .await
            .unwrap();

        pool.run_migrations().await.unwrap();
        assert!(pool.health_check().await.is_ok());
        assert_eq!(pool.get_pool().options().get_max_connections(), 1);
    }

    #[tokio::test]
    async fn test_health_check_fails_after_close() {
        let pool = DatabasePool::new(DatabaseConfig::new("sqlite::memory:"))
            .await
            .unwrap();
        pool.close().await;

        assert!(pool.health_check().await.is_err());
    }
}
