//! Centrum Heights Client
//!
//! Client-side lead capture for the Centrum Heights API.
//!
//! # Features
//!
//! - **Authentication**: register/login with an explicit [`Session`] that is
//!   persisted through a [`SessionStore`]
//! - **Lead capture**: the confirmed inline [`LeadForm`] and the optimistic
//!   [`BrochureModal`]
//! - **Brochure**: login-gated download, or a bundled copy via [`Deliverable`]
//!
//! # Example
//!
//! ```ignore
//! use heights_client::{ClientConfig, FileSessionStore, HeightsClient, LeadDraft, LeadForm, Session};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HeightsClient::new(ClientConfig::new("https://api.example.com"))?;
//!     let session = Session::restore(Arc::new(FileSessionStore::new("session.json"))).await;
//!
//!     let form = LeadForm::new(client, session);
//!     form.set_draft(LeadDraft::new("Asha", "+91 98200 00000"));
//!     form.submit().await?;
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod capture;
mod client;
mod deliverable;
mod download;
mod error;
mod session;
mod types;

// Re-export main types
pub use capture::{
    BrochureModal, FormState, LeadCapture, LeadDraft, LeadForm, ModalState, SubmitOutcome,
    WritePolicy, DEFAULT_ACK_DURATION, DEFAULT_RESET_DELAY, MISSING_FIELDS_PROMPT,
    SUBMISSION_FAILED_MESSAGE,
};
pub use client::HeightsClient;
pub use deliverable::{Deliverable, FileDeliverable, ServerDeliverable, BROCHURE_FILE_NAME};
pub use error::{ClientError, Result};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore, StoredSession};
pub use types::{ClientConfig, DownloadProgress, HealthInfo};

// Re-export sub-clients for direct use if needed
pub use auth::AuthClient;
pub use download::DownloadClient;
