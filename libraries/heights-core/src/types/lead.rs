/// Lead domain types
use super::ids::LeadId;
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message returned when a submission lacks a name or phone number
pub const MISSING_REQUIRED_FIELDS: &str = "Name and phone are required";

/// A stored prospective-customer submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    /// Generated identifier
    pub id: LeadId,

    /// Contact name
    pub name: String,

    /// Contact phone number (free-form, not validated)
    pub phone: String,

    /// Contact email (free-form, not validated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Free-text message from the visitor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp (equal to `created_at`, leads are never updated)
    pub updated_at: DateTime<Utc>,
}

/// Raw lead payload as submitted by a visitor.
///
/// Every field is optional on the wire; [`LeadSubmission::validate`] turns it
/// into a [`NewLead`] once the required fields are known to be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    /// Required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Optional, blank counts as absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Optional, blank counts as absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LeadSubmission {
    /// Create a submission with only the required fields
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            phone: Some(phone.into()),
            email: None,
            message: None,
        }
    }

    /// Set the optional email
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the optional message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Check that `name` and `phone` are present and non-blank.
    ///
    /// No other field is validated. Blank optional fields are dropped.
    pub fn validate(self) -> Result<NewLead> {
        let name = non_blank(self.name);
        let phone = non_blank(self.phone);

        match (name, phone) {
            (Some(name), Some(phone)) => Ok(NewLead {
                name,
                phone,
                email: non_blank(self.email),
                message: non_blank(self.message),
            }),
            _ => Err(CoreError::validation(MISSING_REQUIRED_FIELDS)),
        }
    }
}

/// A lead that passed validation and is ready to persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    /// Trimmed, never empty
    pub name: String,
    /// Trimmed, never empty
    pub phone: String,
    /// Present only when non-blank
    pub email: Option<String>,
    /// Present only when non-blank
    pub message: Option<String>,
}

impl NewLead {
    /// Plain-text summary used for notification emails
    pub fn summary(&self) -> String {
        format!(
            "New lead:\nName: {}\nPhone: {}\nEmail: {}\nMessage: {}",
            self.name,
            self.phone,
            self.email.as_deref().unwrap_or("-"),
            self.message.as_deref().unwrap_or("-"),
        )
    }
}

impl From<&Lead> for NewLead {
    fn from(lead: &Lead) -> Self {
        Self {
            name: lead.name.clone(),
            phone: lead.phone.clone(),
            email: lead.email.clone(),
            message: lead.message.clone(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
