//! Request and response bodies shared by the server and the client.

use super::lead::Lead;
use super::user::UserProfile;
use serde::{Deserialize, Serialize};

/// `POST /api/leads` success body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadCreatedResponse {
    /// Always "Lead submitted successfully"
    pub message: String,
    /// The stored record, serialized as `newLead`
    pub new_lead: Lead,
}

/// Generic `{message}` body used for acknowledgments and errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable text safe to show to a visitor
    pub message: String,

    /// Diagnostic detail, only present on server-side failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageResponse {
    /// Body without diagnostic detail
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }
}

/// `POST /api/test/email` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailRequest {
    /// Recipient address
    #[serde(default)]
    pub to: String,
    /// Subject line
    #[serde(default)]
    pub subject: String,
    /// Plain-text body
    #[serde(default)]
    pub text: String,
}

/// `POST /api/auth/login` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email, matched case-insensitively
    #[serde(default)]
    pub email: String,
    /// Plain-text password
    #[serde(default)]
    pub password: String,
}

/// `POST /api/auth/register` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Account email, stored normalized
    #[serde(default)]
    pub email: String,
    /// Plain-text password, hashed before storage
    #[serde(default)]
    pub password: String,
}

/// Successful login/registration: an opaque bearer token plus the user snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer credential for later requests
    pub token: String,
    /// The signed-in account
    pub user: UserProfile,
}
