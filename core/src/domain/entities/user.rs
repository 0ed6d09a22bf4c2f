//! User entity representing a registered account.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};

/// User entity representing a registered account
///
/// The password hash is opaque to everything but the password hasher and is
/// never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique identifier for the user (UUID v4 text)
    pub id: String,

    /// Unique login name
    pub username: String,

    /// Unique email address
    pub email: String,

    /// One-way password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Creates a new User with a freshly generated identifier
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Checks that every field is populated
    pub fn validate(&self) -> DomainResult<()> {
        require_non_blank("user id", &self.id)?;
        require_non_blank("username", &self.username)?;
        require_non_blank("email", &self.email)?;
        require_non_blank("password hash", &self.password_hash)
    }

    /// Applies a partial update in place
    pub fn apply(&mut self, update: &UserUpdate) {
        if let Some(username) = &update.username {
            self.username = username.clone();
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(password_hash) = &update.password_hash {
            self.password_hash = password_hash.clone();
        }
    }
}

/// Partial update for a user, at least one field must be set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password_hash.is_none()
    }

    /// Rejects empty updates and supplied-but-blank fields
    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::invalid_input(
                "at least one of username, email or password hash is required",
            ));
        }
        if let Some(username) = &self.username {
            require_non_blank("username", username)?;
        }
        if let Some(email) = &self.email {
            require_non_blank("email", email)?;
        }
        if let Some(password_hash) = &self.password_hash {
            require_non_blank("password hash", password_hash)?;
        }
        Ok(())
    }
}

/// The identifier a user logs in with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Username(String),
    Email(String),
}

impl LoginIdentifier {
    /// Builds an identifier from optional request fields
    ///
    /// Exactly one of `username` and `email` must be present and non-blank.
    pub fn from_parts(username: Option<&str>, email: Option<&str>) -> DomainResult<Self> {
        let username = username.map(str::trim).filter(|s| !s.is_empty());
        let email = email.map(str::trim).filter(|s| !s.is_empty());

        match (username, email) {
            (Some(username), None) => Ok(Self::Username(username.to_string())),
            (None, Some(email)) => Ok(Self::Email(email.to_string())),
            (Some(_), Some(_)) => Err(DomainError::invalid_input(
                "provide either a username or an email, not both",
            )),
            (None, None) => Err(DomainError::invalid_input("a username or an email is required")),
        }
    }
}

pub fn require_non_blank(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_input(format!("{} must not be empty", field)));
    }
    Ok(())
}
