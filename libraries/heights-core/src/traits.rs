//! Store traits implemented by the persistence layer
//!
//! The server only talks to storage through these traits, so tests can swap
//! in failing or mocked stores without a database.

use crate::error::Result;
use crate::types::{Lead, LeadId, NewLead, NewUser, UserId, UserProfile};
use async_trait::async_trait;

/// Append-only lead persistence.
///
/// Leads are created exactly once and never updated or deleted.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Persist a validated lead, assigning its id and timestamps
    async fn create_lead(&self, lead: NewLead) -> Result<Lead>;

    /// Get a lead by ID
    async fn get_lead(&self, id: &LeadId) -> Result<Option<Lead>>;

    /// Most recent leads first
    async fn list_leads(&self, limit: u32) -> Result<Vec<Lead>>;

    /// Total number of stored leads
    async fn count_leads(&self) -> Result<u64>;
}

/// Account persistence used by the authentication endpoints
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user together with its password hash.
    ///
    /// Fails with `CoreError::Duplicate` if the email is already registered.
    async fn create_user(&self, user: NewUser, password_hash: &str) -> Result<UserProfile>;

    /// Look up a user by (normalized) email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserProfile>>;

    /// Look up a user by ID
    async fn get_user(&self, id: &UserId) -> Result<Option<UserProfile>>;

    /// Stored bcrypt hash, if the user has credentials
    async fn password_hash(&self, id: &UserId) -> Result<Option<String>>;
}
