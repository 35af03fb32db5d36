//! Lead capture forms.
//!
//! Two write paths exist on purpose:
//!
//! - [`LeadForm`] is the inline contact form. It waits for the server
//!   ([`WritePolicy::Confirmed`]) and keeps the visitor's input when the
//!   request fails so they can retry.
//! - [`BrochureModal`] hands over the brochure first and syncs the lead in the
//!   background ([`WritePolicy::Optimistic`]). The visitor never waits, and a
//!   failed sync is only logged, so leads can be lost.

use crate::client::HeightsClient;
use crate::deliverable::Deliverable;
use crate::error::{ClientError, Result};
use crate::session::Session;
use async_trait::async_trait;
use heights_core::{Lead, LeadSubmission};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shown when name or phone is missing
pub const MISSING_FIELDS_PROMPT: &str = "Please enter name and phone number";

/// Shown when the server gave no usable reason
pub const SUBMISSION_FAILED_MESSAGE: &str = "Submission failed. Please try again later.";

pub const DEFAULT_ACK_DURATION: Duration = Duration::from_secs(5);
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(2);

/// When a form reports success relative to the server write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Success only after the server stored the lead
    Confirmed,
    /// Success immediately; the lead is sent in the background
    Optimistic,
}

/// Result of a submit that passed local validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Server stored the lead
    Confirmed(Lead),
    /// Deliverable handed over, lead sync running in the background
    Delivered(PathBuf),
    /// A previous submit is still in progress; nothing was sent
    AlreadyPending,
}

/// What the visitor has typed so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub message: String,
}

impl LeadDraft {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Name and phone are both filled in
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.phone.trim().is_empty()
    }

    /// Wire payload; blank optional fields are left out
    pub fn to_submission(&self) -> LeadSubmission {
        let optional = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        LeadSubmission {
            name: Some(self.name.trim().to_string()),
            phone: Some(self.phone.trim().to_string()),
            email: optional(&self.email),
            message: optional(&self.message),
        }
    }
}

/// Something that turns a draft into a lead.
#[async_trait]
pub trait LeadCapture: Send + Sync {
    fn policy(&self) -> WritePolicy;

    async fn submit(&self) -> Result<SubmitOutcome>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds a busy flag for its lifetime.
///
/// Forgetting the guard leaves the flag set for someone else to clear.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// Confirmed write
// =============================================================================

/// Visible state of the inline form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub draft: LeadDraft,
    /// Prompt or failure reason
    pub error: Option<String>,
    /// Acknowledgment currently shown
    pub acknowledged: bool,
}

/// Inline contact form that waits for the server.
pub struct LeadForm {
    client: HeightsClient,
    session: Session,
    state: Arc<Mutex<FormState>>,
    pending: AtomicBool,
    /// Bumped per success so an older timer never hides a newer acknowledgment
    ack_generation: Arc<AtomicU64>,
    ack_duration: Duration,
}

impl LeadForm {
    pub fn new(client: HeightsClient, session: Session) -> Self {
        Self {
            client,
            session,
            state: Arc::new(Mutex::new(FormState::default())),
            pending: AtomicBool::new(false),
            ack_generation: Arc::new(AtomicU64::new(0)),
            ack_duration: DEFAULT_ACK_DURATION,
        }
    }

    /// How long the acknowledgment stays visible after a confirmed submit
    #[must_use]
    pub fn with_ack_duration(mut self, duration: Duration) -> Self {
        self.ack_duration = duration;
        self
    }

    pub fn set_draft(&self, draft: LeadDraft) {
        lock(&self.state).draft = draft;
    }

    pub fn state(&self) -> FormState {
        lock(&self.state).clone()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Submit the current draft and wait for the server.
    ///
    /// Returns as soon as the server answers. On success the draft is cleared
    /// and the acknowledgment is shown, then hidden by a detached timer after
    /// the configured duration. On failure the draft is kept and the reason
    /// recorded in [`FormState::error`].
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let Some(_busy) = BusyGuard::acquire(&self.pending) else {
            debug!("Lead form already submitting");
            return Ok(SubmitOutcome::AlreadyPending);
        };

        let submission = {
            let mut state = lock(&self.state);
            if !state.draft.is_complete() {
                state.error = Some(MISSING_FIELDS_PROMPT.to_string());
                return Err(ClientError::Validation(MISSING_FIELDS_PROMPT.to_string()));
            }
            state.error = None;
            state.draft.to_submission()
        };

        match self.client.submit_lead(&self.session, &submission).await {
            Ok(lead) => {
                info!(lead_id = %lead.id, "Lead confirmed");
                {
                    let mut state = lock(&self.state);
                    state.draft = LeadDraft::default();
                    state.acknowledged = true;
                }
                self.spawn_ack_timer();

                Ok(SubmitOutcome::Confirmed(lead))
            }
            Err(e) => {
                warn!(error = %e, "Lead submission failed");
                let message = e
                    .server_message()
                    .unwrap_or(SUBMISSION_FAILED_MESSAGE)
                    .to_string();
                lock(&self.state).error = Some(message);
                Err(e)
            }
        }
    }

    fn spawn_ack_timer(&self) {
        let shared = Arc::clone(&self.state);
        let generation = Arc::clone(&self.ack_generation);
        let mine = generation.fetch_add(1, Ordering::AcqRel) + 1;
        let duration = self.ack_duration;

        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if generation.load(Ordering::Acquire) == mine {
                lock(&shared).acknowledged = false;
            }
        });
    }
}

#[async_trait]
impl LeadCapture for LeadForm {
    fn policy(&self) -> WritePolicy {
        WritePolicy::Confirmed
    }

    async fn submit(&self) -> Result<SubmitOutcome> {
        LeadForm::submit(self).await
    }
}

// =============================================================================
// Optimistic write
// =============================================================================

/// Visible state of the brochure modal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalState {
    pub draft: LeadDraft,
    pub open: bool,
    /// Success currently shown
    pub submitted: bool,
    pub error: Option<String>,
}

/// Brochure request modal that rewards the visitor before the server answers.
pub struct BrochureModal {
    client: HeightsClient,
    session: Session,
    deliverable: Arc<dyn Deliverable>,
    state: Arc<Mutex<ModalState>>,
    busy: Arc<AtomicBool>,
    reset_delay: Duration,
}

impl BrochureModal {
    pub fn new(client: HeightsClient, session: Session, deliverable: Arc<dyn Deliverable>) -> Self {
        Self {
            client,
            session,
            deliverable,
            state: Arc::new(Mutex::new(ModalState::default())),
            busy: Arc::new(AtomicBool::new(false)),
            reset_delay: DEFAULT_RESET_DELAY,
        }
    }

    /// How long success stays visible before the modal resets and closes
    #[must_use]
    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    pub fn open(&self) {
        lock(&self.state).open = true;
    }

    pub fn close(&self) {
        let mut state = lock(&self.state);
        state.open = false;
        state.error = None;
    }

    pub fn set_draft(&self, draft: LeadDraft) {
        lock(&self.state).draft = draft;
    }

    pub fn state(&self) -> ModalState {
        lock(&self.state).clone()
    }

    /// Deliver the brochure, show success, then sync the lead in the background.
    ///
    /// Only a failed delivery is reported. The lead request runs detached and
    /// its failure is logged. After the reset delay the draft is cleared and
    /// the modal closes whether or not the request has finished.
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let submission = {
            let mut state = lock(&self.state);
            if !state.draft.is_complete() {
                state.error = Some(MISSING_FIELDS_PROMPT.to_string());
                return Err(ClientError::Validation(MISSING_FIELDS_PROMPT.to_string()));
            }
            state.draft.to_submission()
        };

        let Some(busy) = BusyGuard::acquire(&self.busy) else {
            debug!("Brochure modal still showing success");
            return Ok(SubmitOutcome::AlreadyPending);
        };

        let path = match self.deliverable.deliver().await {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Brochure delivery failed");
                lock(&self.state).error = Some(SUBMISSION_FAILED_MESSAGE.to_string());
                return Err(e);
            }
        };

        // The reset task clears the flag once success has been shown
        std::mem::forget(busy);

        {
            let mut state = lock(&self.state);
            state.submitted = true;
            state.error = None;
        }

        self.spawn_lead_sync(submission);
        self.spawn_reset();

        Ok(SubmitOutcome::Delivered(path))
    }

    fn spawn_lead_sync(&self, submission: LeadSubmission) {
        let client = self.client.clone();
        let session = self.session.clone();

        tokio::spawn(async move {
            match client.submit_lead(&session, &submission).await {
                Ok(lead) => info!(lead_id = %lead.id, "Background lead sync succeeded"),
                Err(e) => warn!(error = %e, "Background lead sync failed"),
            }
        });
    }

    fn spawn_reset(&self) {
        let shared = Arc::clone(&self.state);
        let busy = Arc::clone(&self.busy);
        let delay = self.reset_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut state = lock(&shared);
                state.draft = LeadDraft::default();
                state.submitted = false;
                state.open = false;
            }
            busy.store(false, Ordering::Release);
        });
    }
}

#[async_trait]
impl LeadCapture for BrochureModal {
    fn policy(&self) -> WritePolicy {
        WritePolicy::Optimistic
    }

    async fn submit(&self) -> Result<SubmitOutcome> {
        BrochureModal::submit(self).await
    }
}
