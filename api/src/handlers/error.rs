//! Mapping of domain errors onto HTTP responses

use actix_web::{http::StatusCode, HttpResponse};

use authsvc_core::errors::{DomainError, TokenError};
use authsvc_shared::{error_codes, ErrorResponse};

const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username, email or password";

/// Convert a domain error into the matching HTTP response
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    let (status, body) = classify(&error);
    if status.is_server_error() {
        tracing::error!(error = %error, status = status.as_u16(), "request failed");
    } else {
        tracing::debug!(error = %error, status = status.as_u16(), "request rejected");
    }
    HttpResponse::build(status).json(body)
}

/// Login failures never reveal whether the user exists
pub fn handle_login_error(error: DomainError) -> HttpResponse {
    match error {
        DomainError::NotFound { .. } | DomainError::InvalidPassword => {
            HttpResponse::Unauthorized().json(ErrorResponse::new(
                error_codes::INVALID_CREDENTIALS,
                INVALID_CREDENTIALS_MESSAGE,
            ))
        }
        other => handle_domain_error(other),
    }
}

fn classify(error: &DomainError) -> (StatusCode, ErrorResponse) {
    match error {
        DomainError::InvalidInput { message } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new(error_codes::BAD_REQUEST, message.clone()),
        ),
        DomainError::Token(reason) => {
            let code = match reason {
                TokenError::Expired => error_codes::TOKEN_EXPIRED,
                TokenError::Revoked => error_codes::TOKEN_REVOKED,
                _ => error_codes::TOKEN_INVALID,
            };
            (StatusCode::UNAUTHORIZED, ErrorResponse::new(code, reason.to_string()))
        }
        DomainError::InvalidPassword => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::new(error_codes::INVALID_CREDENTIALS, INVALID_CREDENTIALS_MESSAGE),
        ),
        DomainError::NotFound { resource } => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new(error_codes::NOT_FOUND, format!("{} not found", resource))
                .add_detail("resource", resource),
        ),
        DomainError::AlreadyExists { resource } => (
            StatusCode::CONFLICT,
            ErrorResponse::new(error_codes::ALREADY_EXISTS, format!("{} already exists", resource))
                .add_detail("resource", resource),
        ),
        DomainError::Backend { .. }
        | DomainError::DeadlineExceeded { .. }
        | DomainError::TransactionRollbackFailed { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorResponse::new(
                error_codes::SERVICE_UNAVAILABLE,
                "A backend is temporarily unavailable, retry later",
            ),
        ),
        DomainError::Revocation(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred"),
        ),
    }
}
