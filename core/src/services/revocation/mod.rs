//! Revocation of tokens before their natural expiry
//!
//! - `cache` - the key/value boundary the revocation list writes through
//! - `list` - per-jti revocation markers with bounded lifetime

mod cache;
mod list;

pub use cache::{CacheStore, InMemoryCacheStore};
pub use list::{RevocationList, REVOKED_KEY_PREFIX};
