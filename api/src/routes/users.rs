use actix_web::{http::header, web, HttpRequest, HttpResponse};

use authsvc_core::domain::entities::token::TokenKind;
use authsvc_core::repositories::CredentialStore;
use authsvc_core::services::CacheStore;
use authsvc_shared::{error_codes, ErrorResponse};

use crate::app::AppState;
use crate::dto::RevokedResponse;
use crate::handlers::handle_domain_error;

/// Handler for POST /api/v1/users/{user_id}/revoke
///
/// Revokes every live token of the user. The caller must present a valid
/// access token of that same user as `Authorization: Bearer <token>`.
pub async fn revoke_all<S, C>(
    req: HttpRequest,
    state: web::Data<AppState<S, C>>,
    user_id: web::Path<String>,
) -> HttpResponse
where
    S: CredentialStore + 'static,
    C: CacheStore + 'static,
{
    let Some(token) = bearer_token(&req) else {
        return HttpResponse::Unauthorized().json(ErrorResponse::new(
            error_codes::MISSING_TOKEN,
            "An access token is required",
        ));
    };

    let caller = match state.session.verify(token, TokenKind::Access).await {
        Ok(caller) => caller,
        Err(error) => return handle_domain_error(error),
    };
    if caller.id != user_id.as_str() {
        tracing::warn!(caller = %caller.id, user_id = %user_id.as_str(), "revoke-all for another user refused");
        return HttpResponse::Forbidden().json(ErrorResponse::new(
            error_codes::FORBIDDEN,
            "Tokens can only be revoked by their owner",
        ));
    }

    match state.session.revoke_all(&user_id).await {
        Ok(revoked_at) => HttpResponse::Ok().json(RevokedResponse { revoked_at }),
        Err(error) => handle_domain_error(error),
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
