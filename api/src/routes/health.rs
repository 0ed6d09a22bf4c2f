use actix_web::{web, HttpResponse};

use authsvc_core::repositories::CredentialStore;
use authsvc_core::services::CacheStore;

use crate::app::AppState;

/// Health check endpoint handler
///
/// Answers 503 when either backend is unreachable.
pub async fn health<S, C>(state: web::Data<AppState<S, C>>) -> HttpResponse
where
    S: CredentialStore + 'static,
    C: CacheStore + 'static,
{
    let report = state.session.health().await;
    let body = serde_json::json!({
        "status": if report.is_healthy() { "healthy" } else { "degraded" },
        "service": "authsvc-api",
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "credential_store": report.store,
            "revocation_cache": report.cache,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    if report.is_healthy() {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
