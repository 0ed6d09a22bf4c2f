//! Business services containing the token and session logic.

pub mod password;
pub mod revocation;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use password::{BcryptPasswordHasher, PasswordHasher};
pub use revocation::{CacheStore, InMemoryCacheStore, RevocationList};
pub use session::{HealthReport, SessionConfig, SessionManager};
pub use token::{TokenCodec, TokenServiceConfig};
