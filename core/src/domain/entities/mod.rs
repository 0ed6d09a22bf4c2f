//! Domain entities representing core business objects.

pub mod token;
pub mod user;

// Re-export commonly used types
pub use token::{
    hash_token_value, Claims, Token, TokenKind, TokenMetadata, TokenPair, ACCESS_TOKEN_SUBJECT,
    REFRESH_TOKEN_SUBJECT,
};
pub use user::{LoginIdentifier, User, UserUpdate};
