use actix_web::{web, HttpResponse};

use authsvc_core::domain::entities::user::LoginIdentifier;
use authsvc_core::repositories::CredentialStore;
use authsvc_core::services::CacheStore;

use crate::app::AppState;
use crate::dto::{LoginRequest, TokenPairResponse};
use crate::handlers::{handle_domain_error, handle_login_error};

/// Handler for POST /api/v1/auth/login
///
/// # Request Body
///
/// ```json
/// {
///     "email": "alice@example.com",
///     "password": "correct horse battery staple"
/// }
/// ```
///
/// Exactly one of `username` or `email` must be supplied.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "tokens": [
///         { "kind": "refresh", "token": "eyJ...", "jti": "...", "expires_at": "..." },
///         { "kind": "access", "token": "eyJ...", "jti": "...", "expires_at": "..." }
///     ]
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: missing identifier or password
/// - 401 Unauthorized: unknown user or wrong password, same body for both
pub async fn login<S, C>(
    state: web::Data<AppState<S, C>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    S: CredentialStore + 'static,
    C: CacheStore + 'static,
{
    let identifier =
        match LoginIdentifier::from_parts(request.username.as_deref(), request.email.as_deref()) {
            Ok(identifier) => identifier,
            Err(error) => return handle_domain_error(error),
        };

    match state.session.login(&identifier, &request.password).await {
        Ok(pair) => HttpResponse::Ok().json(TokenPairResponse::from(pair)),
        Err(error) => handle_login_error(error),
    }
}
