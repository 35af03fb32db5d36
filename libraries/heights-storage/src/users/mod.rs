//! User management and authentication queries

use crate::{Result, StorageError};
use heights_core::types::{normalize_email, NewUser, UserId, UserProfile};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Create a user and its credentials in one transaction
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `user` - Name and normalized email
/// * `password_hash` - Hashed password (should already be hashed with bcrypt)
///
/// # Errors
///
/// Returns `StorageError::Duplicate` if the email is already registered
pub async fn create(pool: &SqlitePool, user: NewUser, password_hash: &str) -> Result<UserProfile> {
    let id = UserId::generate();
    let now = chrono::Utc::now().timestamp();

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO users (id, name, email, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::from_insert(e, format!("user {}", user.email)))?;

    sqlx::query(
        "INSERT INTO user_credentials (user_id, password_hash, updated_at)
         VALUES (?, ?, datetime('now'))",
    )
    .bind(&id)
    .bind(password_hash)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(UserProfile {
        id,
        name: user.name,
        email: user.email,
    })
}

/// Find a user by email (compared normalized)
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserProfile>> {
    let row = sqlx::query("SELECT id, name, email FROM users WHERE email = ?")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

    row.map(|r| from_row(&r)).transpose()
}

/// Get a user by ID
pub async fn get_by_id(pool: &SqlitePool, id: &UserId) -> Result<Option<UserProfile>> {
    let row = sqlx::query("SELECT id, name, email FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(|r| from_row(&r)).transpose()
}

/// Get user's password hash for authentication
///
/// Returns `None` if the user has no credentials
pub async fn get_password_hash(pool: &SqlitePool, user_id: &UserId) -> Result<Option<String>> {
    let hash = sqlx::query_scalar("SELECT password_hash FROM user_credentials WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(hash)
}

fn from_row(row: &SqliteRow) -> Result<UserProfile> {
    Ok(UserProfile {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
    })
}
