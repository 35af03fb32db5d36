/// Shared application state
use crate::services::{AuthService, LeadService, Notifier};
use heights_core::UserStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub leads: Arc<LeadService>,
    pub users: Arc<dyn UserStore>,
    pub auth_service: Arc<AuthService>,
    pub notifier: Arc<dyn Notifier>,
    pub mail_timeout: Duration,
    pub brochure_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        leads: Arc<LeadService>,
        users: Arc<dyn UserStore>,
        auth_service: Arc<AuthService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            leads,
            users,
            auth_service,
            notifier,
            mail_timeout: Duration::from_secs(10),
            brochure_path: None,
        }
    }

    #[must_use]
    pub fn with_mail_timeout(mut self, timeout: Duration) -> Self {
        self.mail_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_brochure(mut self, path: Option<PathBuf>) -> Self {
        self.brochure_path = path;
        self
    }
}
