use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;

use authsvc_api::{create_app, telemetry, AppState};
use authsvc_core::services::{BcryptPasswordHasher, SessionConfig, SessionManager};
use authsvc_infra::{DatabasePool, RedisClient, SqliteCredentialStore};
use authsvc_shared::{AppConfig, Environment};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Environment specific file first, then the generic one; real env vars win
    let environment = std::env::var("ENVIRONMENT")
        .ok()
        .and_then(|value| value.parse::<Environment>().ok())
        .unwrap_or_default();
    dotenvy::from_filename(environment.env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;
    telemetry::init_tracing(&config.logging)?;

    info!(
        environment = %config.environment,
        bind = %config.server.bind_address(),
        "Starting authsvc API server"
    );

    let database = DatabasePool::new(config.database.clone())
        .await
        .context("failed to open the credential store")?;
    database
        .run_migrations()
        .await
        .context("failed to migrate the credential store")?;

    let cache = RedisClient::new(config.cache.clone())
        .await
        .context("failed to connect to the revocation cache")?;

    let session = SessionManager::new(
        Arc::new(SqliteCredentialStore::from_database(&database)),
        Arc::new(cache),
        Arc::new(BcryptPasswordHasher::default()),
        SessionConfig::from(&config),
    );
    let state = web::Data::new(AppState::new(session));

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(config.server.bind_address())
        .with_context(|| format!("failed to bind {}", config.server.bind_address()))?
        .run()
        .await?;

    database.close().await;
    info!("authsvc API server stopped");
    Ok(())
}
