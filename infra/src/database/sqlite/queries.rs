//! Database query functions.
//!
//! Every statement the credential store issues lives here. The functions take
//! a plain connection so the same code runs on a pooled connection and inside
//! an open transaction.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use authsvc_core::domain::entities::token::{TokenKind, TokenMetadata};
use authsvc_core::domain::entities::user::{User, UserUpdate};
use authsvc_core::errors::{DomainError, DomainResult};

const USER_COLUMNS: &str = "user_id, username, email, password_hash";
const TOKEN_COLUMNS: &str = "jti, user_id, kind, token_hash, issued_at, expires_at";

pub async fn insert_user(conn: &mut SqliteConnection, user: &User) -> DomainResult<()> {
    sqlx::query("INSERT INTO users (user_id, username, email, password_hash) VALUES (?, ?, ?, ?)")
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .execute(conn)
        .await
        .map_err(|e| write_error(e, "user"))?;
    Ok(())
}

/// Apply the fields present in `update`, `NotFound` when no row matched
pub async fn update_user(
    conn: &mut SqliteConnection,
    id: &str,
    update: &UserUpdate,
) -> DomainResult<()> {
    let result = sqlx::query(
        "UPDATE users SET \
             username = COALESCE(?, username), \
             email = COALESCE(?, email), \
             password_hash = COALESCE(?, password_hash), \
             updated_at = CURRENT_TIMESTAMP \
         WHERE user_id = ?",
    )
    .bind(update.username.as_deref())
    .bind(update.email.as_deref())
    .bind(update.password_hash.as_deref())
    .bind(id)
    .execute(conn)
    .await
    .map_err(|e| write_error(e, "user"))?;

    if result.rows_affected() == 0 {
        return Err(DomainError::not_found("user"));
    }
    Ok(())
}

/// Column a user lookup filters on
#[derive(Debug, Clone, Copy)]
pub enum UserKey {
    Id,
    Username,
    Email,
}

impl UserKey {
    fn column(self) -> &'static str {
        match self {
            UserKey::Id => "user_id",
            UserKey::Username => "username",
            UserKey::Email => "email",
        }
    }
}

pub async fn find_user(conn: &mut SqliteConnection, key: UserKey, value: &str) -> DomainResult<User> {
    let sql = format!(
        "SELECT {} FROM users WHERE {} = ? LIMIT 1",
        USER_COLUMNS,
        key.column()
    );

    let row = sqlx::query(&sql)
        .bind(value)
        .fetch_optional(conn)
        .await
        .map_err(read_error)?;

    match row {
        Some(row) => row_to_user(&row),
        None => Err(DomainError::not_found("user")),
    }
}

/// Column of an existing user already holding `username` or `email`
pub async fn taken_identity(
    conn: &mut SqliteConnection,
    username: &str,
    email: &str,
) -> DomainResult<Option<&'static str>> {
    let row = sqlx::query("SELECT username FROM users WHERE username = ? OR email = ? LIMIT 1")
        .bind(username)
        .bind(email)
        .fetch_optional(conn)
        .await
        .map_err(read_error)?;

    Ok(match row {
        Some(row) => {
            let holder: String = column(&row, "username")?;
            Some(if holder == username { "username" } else { "email" })
        }
        None => None,
    })
}

pub async fn user_exists(conn: &mut SqliteConnection, id: &str) -> DomainResult<bool> {
    let row = sqlx::query("SELECT 1 FROM users WHERE user_id = ? LIMIT 1")
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(read_error)?;
    Ok(row.is_some())
}

pub async fn insert_token(conn: &mut SqliteConnection, token: &TokenMetadata) -> DomainResult<()> {
    sqlx::query(
        "INSERT INTO tokens (jti, user_id, kind, token_hash, issued_at, expires_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&token.jti)
    .bind(&token.user_id)
    .bind(token.kind.as_str())
    .bind(&token.token_hash)
    .bind(token.issued_at.timestamp_millis())
    .bind(token.expires_at.timestamp_millis())
    .execute(conn)
    .await
    .map_err(|e| write_error(e, "token"))?;
    Ok(())
}

pub async fn find_token(conn: &mut SqliteConnection, jti: &str) -> DomainResult<TokenMetadata> {
    let sql = format!("SELECT {} FROM tokens WHERE jti = ? LIMIT 1", TOKEN_COLUMNS);

    let row = sqlx::query(&sql)
        .bind(jti)
        .fetch_optional(conn)
        .await
        .map_err(read_error)?;

    match row {
        Some(row) => row_to_token(&row),
        None => Err(DomainError::not_found("token")),
    }
}

pub async fn tokens_for_user(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> DomainResult<Vec<TokenMetadata>> {
    let sql = format!(
        "SELECT {} FROM tokens WHERE user_id = ? ORDER BY issued_at, jti",
        TOKEN_COLUMNS
    );

    let rows = sqlx::query(&sql)
        .bind(user_id)
        .fetch_all(conn)
        .await
        .map_err(read_error)?;

    rows.iter().map(row_to_token).collect()
}

fn row_to_user(row: &SqliteRow) -> DomainResult<User> {
    Ok(User {
        id: column(row, "user_id")?,
        username: column(row, "username")?,
        email: column(row, "email")?,
        password_hash: column(row, "password_hash")?,
    })
}

fn row_to_token(row: &SqliteRow) -> DomainResult<TokenMetadata> {
    let kind: String = column(row, "kind")?;
    Ok(TokenMetadata {
        jti: column(row, "jti")?,
        user_id: column(row, "user_id")?,
        kind: kind
            .parse::<TokenKind>()
            .map_err(|_| DomainError::backend(format!("stored token has unknown kind {}", kind)))?,
        token_hash: column(row, "token_hash")?,
        issued_at: millis(column(row, "issued_at")?)?,
        expires_at: millis(column(row, "expires_at")?)?,
    })
}

fn column<T>(row: &SqliteRow, name: &str) -> DomainResult<T>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| DomainError::backend(format!("Failed to get {}: {}", name, e)))
}

fn millis(value: i64) -> DomainResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| DomainError::backend(format!("stored timestamp out of range: {}", value)))
}

/// Map a failed write onto the domain taxonomy
///
/// Unique violations name the clashing column, foreign key violations mean
/// the owning user is missing.
pub(crate) fn write_error(err: sqlx::Error, resource: &str) -> DomainError {
    if let Some(db) = err.as_database_error() {
        if db.is_unique_violation() {
            let message = db.message();
            let clashing = if message.contains("users.username") {
                "username"
            } else if message.contains("users.email") {
                "email"
            } else {
                resource
            };
            return DomainError::already_exists(clashing);
        }
        if db.is_foreign_key_violation() {
            return DomainError::not_found("user");
        }
        if db.is_check_violation() {
            return DomainError::invalid_input(format!("{} violates a table constraint", resource));
        }
    }
    tracing::error!(error = %err, resource, "database write failed");
    DomainError::backend(format!("Database query failed: {}", err))
}

pub(crate) fn read_error(err: sqlx::Error) -> DomainError {
    tracing::error!(error = %err, "database read failed");
    DomainError::backend(format!("Database query failed: {}", err))
}
