//! # Authsvc Core
//!
//! Token and session lifecycle engine for the authsvc backend.
//! This crate contains the domain entities, error taxonomy, credential store
//! and cache interfaces, the token codec, the revocation list and the session
//! manager that orchestrates them.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
