/// User domain types
use super::ids::UserId;
use serde::{Deserialize, Serialize};

/// Public snapshot of an account.
///
/// This is what the server returns alongside a token and what the client
/// caches in its session. It never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique user identifier
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Login identity
    pub email: String,
}

/// Account data for registration, before the password is hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Normalized email
    pub email: String,
}

impl NewUser {
    /// Create a new user, normalizing the email
    pub fn new(name: impl Into<String>, email: &str) -> Self {
        Self {
            name: name.into().trim().to_string(),
            email: normalize_email(email),
        }
    }
}

/// Emails are compared trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
