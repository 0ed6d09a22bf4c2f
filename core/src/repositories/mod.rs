//! Credential store interfaces and the in-memory backend.

pub mod memory;
pub mod store;
pub mod token;
pub mod user;

pub use memory::{InMemoryCredentialStore, InMemoryTransaction};
pub use store::{CredentialStore, StoreTransaction};
pub use token::TokenRepository;
pub use user::UserRepository;
