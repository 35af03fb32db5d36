//! Centrum Heights Storage
//!
//! `SQLite` persistence for captured leads and brochure accounts.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each feature (`leads`, `users`) owns its queries
//! - **Trait Seam**: [`LocalStorageContext`] implements the `heights-core`
//!   store traits so the server never touches SQL directly
//! - **Append-only leads**: rows are inserted once and never updated
//!
//! # Example
//!
//! ```rust,no_run
//! use heights_core::{LeadStore, LeadSubmission};
//! use heights_storage::{create_pool, run_migrations, LocalStorageContext};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://heights.db").await?;
//! run_migrations(&pool).await?;
//!
//! let storage = LocalStorageContext::new(pool);
//! let lead = LeadSubmission::new("Asha", "98200 00000").validate()?;
//! let stored = storage.create_lead(lead).await?;
//! println!("stored lead {}", stored.id);
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

// Vertical slices
pub mod leads;
pub mod users;

pub use context::LocalStorageContext;
pub use error::{Result, StorageError};

/// Alias used by the server
pub type Database = LocalStorageContext;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://heights.db`)
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(database_url = %database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
