//! Lead persistence
//!
//! Leads are append-only: this module inserts and reads, nothing else.

use crate::{Result, StorageError};
use chrono::{DateTime, Utc};
use heights_core::types::{Lead, LeadId, NewLead};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Insert a validated lead
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `lead` - Lead that already passed required-field validation
///
/// # Returns
///
/// The stored lead with its generated ID and timestamps
pub async fn create(pool: &SqlitePool, lead: NewLead) -> Result<Lead> {
    let id = LeadId::generate();
    let now = Utc::now();
    let millis = now.timestamp_millis();

    sqlx::query(
        "INSERT INTO leads (id, name, phone, email, message, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&lead.name)
    .bind(&lead.phone)
    .bind(lead.email.as_deref())
    .bind(lead.message.as_deref())
    .bind(millis)
    .bind(millis)
    .execute(pool)
    .await
    .map_err(|e| StorageError::from_insert(e, format!("lead {}", id)))?;

    // Round-trip through millis so the returned value matches what a read yields
    let stamp = from_millis(millis)?;

    Ok(Lead {
        id,
        name: lead.name,
        phone: lead.phone,
        email: lead.email,
        message: lead.message,
        created_at: stamp,
        updated_at: stamp,
    })
}

/// Get a lead by ID
pub async fn get_by_id(pool: &SqlitePool, id: &LeadId) -> Result<Option<Lead>> {
    let row = sqlx::query(
        "SELECT id, name, phone, email, message, created_at, updated_at
         FROM leads WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| from_row(&r)).transpose()
}

/// Most recent leads first
pub async fn list_recent(pool: &SqlitePool, limit: u32) -> Result<Vec<Lead>> {
    let rows = sqlx::query(
        "SELECT id, name, phone, email, message, created_at, updated_at
         FROM leads ORDER BY created_at DESC, id LIMIT ?",
    )
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

/// Count all stored leads
pub async fn count(pool: &SqlitePool) -> Result<u64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leads")
        .fetch_one(pool)
        .await?;

    Ok(count as u64)
}

fn from_row(row: &SqliteRow) -> Result<Lead> {
    Ok(Lead {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        message: row.try_get("message")?,
        created_at: from_millis(row.try_get("created_at")?)?,
        updated_at: from_millis(row.try_get("updated_at")?)?,
    })
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StorageError::CorruptRow(format!("timestamp out of range: {}", millis)))
}
