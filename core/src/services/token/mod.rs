//! Token module for JWT handling
//!
//! This module handles the stateless half of the token lifecycle:
//! - Signing claims into compact HS256 tokens
//! - Verifying signature, algorithm family, time window and issuer
//! - Per-kind secrets, lifetimes and subject labels

mod codec;
mod config;

#[cfg(test)]
mod tests;

pub use codec::TokenCodec;
pub use config::TokenServiceConfig;
