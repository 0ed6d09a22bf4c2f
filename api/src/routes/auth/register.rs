use actix_web::{web, HttpResponse};

use authsvc_core::repositories::CredentialStore;
use authsvc_core::services::CacheStore;

use crate::app::AppState;
use crate::dto::{RegisterRequest, UserResponse};
use crate::handlers::handle_domain_error;

/// Handler for POST /api/v1/auth/register
///
/// # Request Body
///
/// ```json
/// {
///     "username": "alice",
///     "email": "alice@example.com",
///     "password": "correct horse battery staple"
/// }
/// ```
///
/// # Response
///
/// - 201 Created: the registered user
/// - 400 Bad Request: a field is blank
/// - 409 Conflict: username or email is taken
pub async fn register<S, C>(
    state: web::Data<AppState<S, C>>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse
where
    S: CredentialStore + 'static,
    C: CacheStore + 'static,
{
    let request = request.into_inner();
    match state
        .session
        .register(&request.username, &request.email, &request.password)
        .await
    {
        Ok(user) => HttpResponse::Created().json(UserResponse::from(user)),
        Err(error) => handle_domain_error(error),
    }
}
