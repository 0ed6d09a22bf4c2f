//! Session module
//!
//! This module orchestrates the token lifecycle against the backends:
//! - User registration and login
//! - Token verification with revocation checks
//! - Refresh token rotation
//! - Single-token and per-user revocation

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::SessionConfig;
pub use service::{HealthReport, SessionManager};
