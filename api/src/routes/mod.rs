//! Route handlers of the v1 API

pub mod auth;
pub mod health;
pub mod tokens;
pub mod users;
