//! Centrum Heights Core
//!
//! Shared domain types, traits, and error handling for the lead platform.
//!
//! This crate provides the building blocks used by both the intake server
//! and the capture client.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Lead`, `LeadSubmission`, `NewLead`, `UserProfile`
//! - **Wire Types**: request/response bodies shared by server and client
//! - **Core Traits**: `LeadStore`, `UserStore`
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use heights_core::types::LeadSubmission;
//!
//! let submission = LeadSubmission::new("Asha", "+91 98200 00000");
//! let lead = submission.validate().expect("name and phone are present");
//! assert_eq!(lead.name, "Asha");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use traits::{LeadStore, UserStore};

#[cfg(any(test, feature = "mocks"))]
pub use traits::{MockLeadStore, MockUserStore};

pub use types::{
    AuthResponse, EmailRequest, Lead, LeadCreatedResponse, LeadId, LeadSubmission, LoginRequest,
    MessageResponse, NewLead, NewUser, RegisterRequest, UserId, UserProfile,
};
