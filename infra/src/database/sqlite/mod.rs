//! SQLite implementation of the credential store

pub mod queries;
pub mod store;

pub use store::{SqliteCredentialStore, SqliteTransaction};
