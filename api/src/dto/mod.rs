//! Request and response bodies of the v1 API

pub mod auth;
pub mod token;

pub use auth::{LoginRequest, RegisterRequest, UserResponse};
pub use token::{RevokedResponse, TokenPairResponse, TokenRequest, TokenResponse, VerifyRequest};
