//! Application state and factory
//!
//! This module holds the shared application state and builds the Actix-web
//! application with every route of the v1 API.

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use authsvc_core::repositories::CredentialStore;
use authsvc_core::services::{CacheStore, SessionManager};
use authsvc_shared::{error_codes, ErrorResponse};

use crate::routes::{auth, health, tokens, users};

/// State shared by every handler
pub struct AppState<S, C>
where
    S: CredentialStore,
    C: CacheStore,
{
    pub session: SessionManager<S, C>,
}

impl<S, C> AppState<S, C>
where
    S: CredentialStore,
    C: CacheStore,
{
    pub fn new(session: SessionManager<S, C>) -> Self {
        Self { session }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app<S, C>(
    app_state: web::Data<AppState<S, C>>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    S: CredentialStore + 'static,
    C: CacheStore + 'static,
{
    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(ErrorResponse::new(
                error_codes::BAD_REQUEST,
                format!("Invalid request body: {}", err),
            ));
            actix_web::error::InternalError::from_response(err, response).into()
        }))
        .wrap(TracingLogger::default())
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(health::health::<S, C>))
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register::<S, C>))
                        .route("/login", web::post().to(auth::login::<S, C>)),
                )
                .service(
                    web::scope("/tokens")
                        .route("/verify", web::post().to(tokens::verify::<S, C>))
                        .route("/refresh", web::post().to(tokens::refresh::<S, C>))
                        .route("/revoke/access", web::post().to(tokens::revoke_access::<S, C>))
                        .route("/revoke/refresh", web::post().to(tokens::revoke_refresh::<S, C>)),
                )
                .service(
                    web::scope("/users")
                        .route("/{user_id}/revoke", web::post().to(users::revoke_all::<S, C>)),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
