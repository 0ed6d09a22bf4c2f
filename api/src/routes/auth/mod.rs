//! Authentication route handlers
//!
//! - Registration of a new user
//! - Login with username or email

pub mod login;
pub mod register;

pub use login::login;
pub use register::register;
