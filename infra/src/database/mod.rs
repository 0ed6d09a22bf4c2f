//! Database module - SQLite implementations using SQLx
//!
//! This module provides the durable credential store:
//! - Connection pool management and migrations
//! - Query functions shared by pooled and transactional access
//! - The [`SqliteCredentialStore`] with scoped transactions

pub mod connection;
pub mod sqlite;


// Re-export commonly used types
pub use connection::DatabasePool;
pub use sqlite::{SqliteCredentialStore, SqliteTransaction};
