//! Token route handlers
//!
//! Verification, refresh rotation and revocation of presented tokens.

use actix_web::{web, HttpResponse};

use authsvc_core::domain::entities::token::TokenKind;
use authsvc_core::repositories::CredentialStore;
use authsvc_core::services::CacheStore;

use crate::app::AppState;
use crate::dto::{RevokedResponse, TokenPairResponse, TokenRequest, UserResponse, VerifyRequest};
use crate::handlers::handle_domain_error;

/// Handler for POST /api/v1/tokens/verify
///
/// Returns the owner of a live, non-revoked token of the requested kind
/// (access by default). Rejected tokens answer 401.
pub async fn verify<S, C>(
    state: web::Data<AppState<S, C>>,
    request: web::Json<VerifyRequest>,
) -> HttpResponse
where
    S: CredentialStore + 'static,
    C: CacheStore + 'static,
{
    let kind = request.kind.unwrap_or(TokenKind::Access);
    match state.session.verify(&request.token, kind).await {
        Ok(user) => HttpResponse::Ok().json(UserResponse::from(user)),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/tokens/refresh
///
/// Exchanges a refresh token for a new pair. The presented token is revoked
/// and cannot be used again.
pub async fn refresh<S, C>(
    state: web::Data<AppState<S, C>>,
    request: web::Json<TokenRequest>,
) -> HttpResponse
where
    S: CredentialStore + 'static,
    C: CacheStore + 'static,
{
    match state.session.refresh(&request.token).await {
        Ok(pair) => HttpResponse::Ok().json(TokenPairResponse::from(pair)),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/tokens/revoke/access
pub async fn revoke_access<S, C>(
    state: web::Data<AppState<S, C>>,
    request: web::Json<TokenRequest>,
) -> HttpResponse
where
    S: CredentialStore + 'static,
    C: CacheStore + 'static,
{
    match state.session.revoke_access(&request.token).await {
        Ok(revoked_at) => HttpResponse::Ok().json(RevokedResponse { revoked_at }),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/tokens/revoke/refresh
pub async fn revoke_refresh<S, C>(
    state: web::Data<AppState<S, C>>,
    request: web::Json<TokenRequest>,
) -> HttpResponse
where
    S: CredentialStore + 'static,
    C: CacheStore + 'static,
{
    match state.session.revoke_refresh(&request.token).await {
        Ok(revoked_at) => HttpResponse::Ok().json(RevokedResponse { revoked_at }),
        Err(error) => handle_domain_error(error),
    }
}
