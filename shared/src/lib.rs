//! Shared configuration and common types for the authsvc server
//!
//! This crate provides functionality used across all server crates:
//! - Configuration types loaded from the environment
//! - Error response structures for the HTTP surface

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ConfigError, DatabaseConfig, Environment, JwtConfig, LoggingConfig,
    ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
