//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use heights_core::{LeadStore, NewUser, UserProfile, UserStore};
use heights_server::{
    create_router,
    services::{AuthService, LeadService, Notifier, NotifierError},
    state::AppState,
};
use heights_storage::Database;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key";
pub const NOTIFY_EMAIL: &str = "sales@example.com";

/// Test user credentials
pub mod fixtures {
    pub const TEST_NAME: &str = "Test User";
    pub const TEST_EMAIL: &str = "buyer@example.com";
    pub const TEST_PASSWORD: &str = "TestPassword123!";

    pub const BROCHURE_BYTES: &[u8] = b"%PDF-1.4\n% Centrum Heights test brochure\n";
}

/// One email captured by [`RecordingNotifier`]
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Forwards every send to a channel and succeeds
pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<SentEmail>,
}

impl RecordingNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SentEmail>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), NotifierError> {
        let _ = self.tx.send(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Every send fails like an unreachable relay
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _to: &str, _subject: &str, _text: &str) -> Result<(), NotifierError> {
        Err(NotifierError::NotConfigured)
    }
}

/// Never completes a send
pub struct SlowNotifier;

#[async_trait]
impl Notifier for SlowNotifier {
    async fn send(&self, _to: &str, _subject: &str, _text: &str) -> Result<(), NotifierError> {
        std::future::pending().await
    }
}

/// Router over a fresh database in a temp directory
pub struct TestApp {
    pub router: Router,
    pub storage: Arc<Database>,
    pub auth_service: Arc<AuthService>,
    pub temp_dir: TempDir,
}

pub struct TestAppBuilder {
    notifier: Arc<dyn Notifier>,
    lead_store: Option<Arc<dyn LeadStore>>,
    brochure: bool,
    mail_timeout: Duration,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            notifier: Arc::new(FailingNotifier),
            lead_store: None,
            brochure: false,
            mail_timeout: Duration::from_secs(2),
        }
    }

    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Replace the lead store while users stay on the real database
    pub fn lead_store(mut self, store: impl LeadStore + 'static) -> Self {
        self.lead_store = Some(Arc::new(store));
        self
    }

    pub fn with_brochure(mut self) -> Self {
        self.brochure = true;
        self
    }

    pub fn mail_timeout(mut self, timeout: Duration) -> Self {
        self.mail_timeout = timeout;
        self
    }

    pub async fn build(self) -> TestApp {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let url = format!("sqlite://{}", db_path.display());
        let storage = Arc::new(Database::connect(&url).await.unwrap());

        let brochure_path = if self.brochure {
            let path: PathBuf = temp_dir.path().join("brochure.pdf");
            std::fs::write(&path, fixtures::BROCHURE_BYTES).unwrap();
            Some(path)
        } else {
            None
        };

        let lead_store = self
            .lead_store
            .unwrap_or_else(|| Arc::clone(&storage) as Arc<dyn LeadStore>);

        let leads = LeadService::new(lead_store, Arc::clone(&self.notifier))
            .with_recipient(Some(NOTIFY_EMAIL.to_string()))
            .with_notify_timeout(self.mail_timeout);

        // Minimum bcrypt cost keeps auth tests fast
        let auth_service = Arc::new(AuthService::new(TEST_SECRET.to_string(), None).with_hash_cost(4));

        let app_state = AppState::new(
            Arc::new(leads),
            Arc::clone(&storage) as Arc<dyn UserStore>,
            Arc::clone(&auth_service),
            self.notifier,
        )
        .with_mail_timeout(self.mail_timeout)
        .with_brochure(brochure_path);

        TestApp {
            router: create_router(app_state),
            storage,
            auth_service,
            temp_dir,
        }
    }
}

/// Create a test app with a failing notifier and no brochure
pub async fn create_test_app() -> TestApp {
    TestAppBuilder::new().build().await
}

impl TestApp {
    /// Register the fixture user directly and return it with a bearer token
    pub async fn signed_in_user(&self) -> (UserProfile, String) {
        let hash = self
            .auth_service
            .hash_password(fixtures::TEST_PASSWORD)
            .unwrap();
        let user = self
            .storage
            .create_user(NewUser::new(fixtures::TEST_NAME, fixtures::TEST_EMAIL), &hash)
            .await
            .unwrap();
        let token = self.auth_service.issue_token(&user.id).unwrap();
        (user, token)
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        self.router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
