//! Lead intake: validate, persist, then notify in the background.

use crate::error::Result;
use crate::services::notifier::{self, Notifier};
use heights_core::{Lead, LeadStore, LeadSubmission};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const LEAD_NOTIFICATION_SUBJECT: &str = "New Lead Submission - Centrum Heights";

pub struct LeadService {
    store: Arc<dyn LeadStore>,
    notifier: Arc<dyn Notifier>,
    recipient: Option<String>,
    notify_timeout: Duration,
}

impl LeadService {
    pub fn new(store: Arc<dyn LeadStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            recipient: None,
            notify_timeout: Duration::from_secs(10),
        }
    }

    /// Address that receives new-lead notifications; `None` disables them
    #[must_use]
    pub fn with_recipient(mut self, recipient: Option<String>) -> Self {
        self.recipient = recipient.filter(|r| !r.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn LeadStore> {
        &self.store
    }

    /// Validate and persist a submission.
    ///
    /// Missing `name`/`phone` fails before the store is touched. Once the
    /// lead is stored, the notification is spawned and this returns without
    /// waiting for it.
    pub async fn submit(&self, submission: LeadSubmission) -> Result<Lead> {
        let lead = submission.validate()?;
        let summary = lead.summary();

        let stored = self.store.create_lead(lead).await?;
        info!(lead_id = %stored.id, "Lead stored");

        self.notify_detached(summary);

        Ok(stored)
    }

    fn notify_detached(&self, text: String) {
        let Some(to) = self.recipient.clone() else {
            debug!("No notification recipient configured, skipping lead email");
            return;
        };

        let notifier = Arc::clone(&self.notifier);
        let timeout = self.notify_timeout;

        // Not joined: the outcome never reaches the HTTP response
        tokio::spawn(async move {
            match notifier::send_with_timeout(
                notifier.as_ref(),
                timeout,
                &to,
                LEAD_NOTIFICATION_SUBJECT,
                &text,
            )
            .await
            {
                Ok(()) => debug!(to = %to, "Lead notification sent"),
                Err(e) => warn!(error = %e, "Lead notification failed"),
            }
        });
    }
}
