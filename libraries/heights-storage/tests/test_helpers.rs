//! Test helpers and fixtures for storage integration tests
//!
//! These helpers create test databases using REAL SQLite files (NOT in-memory)
//! to match production behavior and properly test migrations and constraints.

use heights_core::types::{NewLead, NewUser, UserProfile};
use heights_storage::LocalStorageContext;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub storage: LocalStorageContext,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let storage = LocalStorageContext::connect(&db_url)
            .await
            .expect("Failed to open test database");

        Self {
            storage,
            _temp_dir: temp_dir,
        }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        self.storage.pool()
    }
}

/// Test fixture: a minimal valid lead
pub fn sample_lead(name: &str) -> NewLead {
    NewLead {
        name: name.to_string(),
        phone: "98200 00000".to_string(),
        email: None,
        message: None,
    }
}

/// Test fixture: Create a test user with a dummy hash
pub async fn create_test_user(pool: &SqlitePool, name: &str, email: &str) -> UserProfile {
    heights_storage::users::create(pool, NewUser::new(name, email), "$2b$04$dummyhash")
        .await
        .expect("Failed to create test user")
}
