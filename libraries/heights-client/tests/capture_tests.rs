//! Tests for the lead capture forms.
//!
//! Each form runs against a wiremock server so the number of lead requests
//! can be asserted exactly.

use async_trait::async_trait;
use heights_client::{
    BrochureModal, ClientConfig, ClientError, Deliverable, FileDeliverable, HeightsClient,
    LeadCapture, LeadDraft, LeadForm, ServerDeliverable, Session, SubmitOutcome, WritePolicy,
    BROCHURE_FILE_NAME, MISSING_FIELDS_PROMPT, SUBMISSION_FAILED_MESSAGE,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn lead_body() -> serde_json::Value {
    json!({
        "message": "Lead submitted successfully",
        "newLead": {
            "id": "lead-1",
            "name": "A",
            "phone": "1",
            "createdAt": "2025-06-01T10:00:00Z",
            "updatedAt": "2025-06-01T10:00:00Z"
        }
    })
}

fn client_for(server: &MockServer) -> HeightsClient {
    HeightsClient::new(ClientConfig::new(server.uri())).unwrap()
}

/// Poll until `condition` holds, failing after five seconds
async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Wait until the mock server has recorded at least `count` requests
async fn wait_for_requests(server: &MockServer, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let seen = server.received_requests().await.map_or(0, |r| r.len());
            if seen >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("requests not received in time");
}

async fn mount_leads(server: &MockServer, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/leads"))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

/// Never finishes delivering
struct StalledDeliverable;

#[async_trait]
impl Deliverable for StalledDeliverable {
    async fn deliver(&self) -> heights_client::Result<PathBuf> {
        std::future::pending().await
    }
}

/// Counts deliveries and writes nothing
struct CountingDeliverable {
    calls: AtomicUsize,
}

#[async_trait]
impl Deliverable for CountingDeliverable {
    async fn deliver(&self) -> heights_client::Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PathBuf::from(BROCHURE_FILE_NAME))
    }
}

fn bundled_brochure(dir: &TempDir) -> FileDeliverable {
    let source = dir.path().join("bundled.pdf");
    std::fs::write(&source, b"%PDF-1.4").unwrap();
    FileDeliverable::new(source, dir.path().join("Downloads"))
}

// =============================================================================
// Confirmed form
// =============================================================================

mod lead_form {
    use super::*;

    #[tokio::test]
    async fn test_reports_confirmed_policy() {
        let server = MockServer::start().await;
        let form = LeadForm::new(client_for(&server), Session::ephemeral());
        assert_eq!(LeadCapture::policy(&form), WritePolicy::Confirmed);
    }

    #[tokio::test]
    async fn test_missing_phone_prompts_without_request() {
        let server = MockServer::start().await;
        mount_leads(&server, ResponseTemplate::new(201), 0).await;

        let form = LeadForm::new(client_for(&server), Session::ephemeral());
        form.set_draft(LeadDraft::new("A", ""));

        let err = form.submit().await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(form.state().error.as_deref(), Some(MISSING_FIELDS_PROMPT));
        assert!(!form.is_pending());
    }

    #[tokio::test]
    async fn test_success_clears_draft_and_acknowledges() {
        let server = MockServer::start().await;
        mount_leads(&server, ResponseTemplate::new(201).set_body_json(lead_body()), 1).await;

        let form = LeadForm::new(client_for(&server), Session::ephemeral())
            .with_ack_duration(Duration::from_millis(300));
        form.set_draft(LeadDraft::new("A", "1").with_message("Call after 6"));

        // Returns once the server answers, not after the acknowledgment
        let outcome = tokio::time::timeout(Duration::from_secs(2), form.submit())
            .await
            .expect("submit must not wait out the acknowledgment")
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::Confirmed(ref lead) if lead.name == "A"));

        let state = form.state();
        assert!(state.acknowledged);
        assert_eq!(state.draft, LeadDraft::default());
        assert!(!form.is_pending());

        // Hidden by its own timer
        wait_until(|| !form.state().acknowledged).await;
    }

    #[tokio::test]
    async fn test_new_submit_allowed_while_acknowledged() {
        let server = MockServer::start().await;
        mount_leads(&server, ResponseTemplate::new(201).set_body_json(lead_body()), 2).await;

        let form = LeadForm::new(client_for(&server), Session::ephemeral())
            .with_ack_duration(Duration::from_secs(60));

        form.set_draft(LeadDraft::new("A", "1"));
        assert!(matches!(form.submit().await.unwrap(), SubmitOutcome::Confirmed(_)));
        assert!(form.state().acknowledged);

        form.set_draft(LeadDraft::new("B", "2"));
        assert!(matches!(form.submit().await.unwrap(), SubmitOutcome::Confirmed(_)));
    }

    #[tokio::test]
    async fn test_cancelled_submit_leaves_form_usable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/leads"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(lead_body())
                    .set_delay(Duration::from_secs(30)),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        mount_leads(&server, ResponseTemplate::new(201).set_body_json(lead_body()), 1).await;

        let form = LeadForm::new(client_for(&server), Session::ephemeral())
            .with_ack_duration(Duration::from_millis(10));
        form.set_draft(LeadDraft::new("A", "1"));

        let cancelled = tokio::time::timeout(Duration::from_millis(300), form.submit()).await;
        assert!(cancelled.is_err());
        assert!(!form.is_pending());
        assert!(!form.state().acknowledged);

        assert!(matches!(form.submit().await.unwrap(), SubmitOutcome::Confirmed(_)));
    }

    #[tokio::test]
    async fn test_server_error_keeps_draft() {
        let server = MockServer::start().await;
        mount_leads(
            &server,
            ResponseTemplate::new(500)
                .set_body_json(json!({ "message": "Server error", "error": "disk full" })),
            1,
        )
        .await;

        let form = LeadForm::new(client_for(&server), Session::ephemeral());
        let draft = LeadDraft::new("A", "1").with_email("a@example.com");
        form.set_draft(draft.clone());

        let err = form.submit().await.unwrap_err();
        assert!(matches!(err, ClientError::ServerError { status: 500, .. }));

        let state = form.state();
        assert_eq!(state.draft, draft);
        assert_eq!(state.error.as_deref(), Some("Server error"));
        assert!(!state.acknowledged);
        assert!(!form.is_pending());
    }

    #[tokio::test]
    async fn test_unexplained_failure_uses_fallback_message() {
        let server = MockServer::start().await;
        mount_leads(&server, ResponseTemplate::new(502), 1).await;

        let form = LeadForm::new(client_for(&server), Session::ephemeral());
        form.set_draft(LeadDraft::new("A", "1"));

        form.submit().await.unwrap_err();
        assert_eq!(form.state().error.as_deref(), Some(SUBMISSION_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_html_error_page_is_not_shown() {
        let server = MockServer::start().await;
        mount_leads(
            &server,
            ResponseTemplate::new(502)
                .set_body_raw("<html><body>502 Bad Gateway</body></html>", "text/html"),
            1,
        )
        .await;

        let form = LeadForm::new(client_for(&server), Session::ephemeral());
        let draft = LeadDraft::new("A", "1");
        form.set_draft(draft.clone());

        let err = form.submit().await.unwrap_err();
        assert!(matches!(err, ClientError::ServerError { status: 502, .. }));
        assert_eq!(err.server_message(), None);

        let state = form.state();
        assert_eq!(state.error.as_deref(), Some(SUBMISSION_FAILED_MESSAGE));
        assert_eq!(state.draft, draft);
    }

    #[tokio::test]
    async fn test_retry_after_failure_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/leads"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        mount_leads(&server, ResponseTemplate::new(201).set_body_json(lead_body()), 1).await;

        let form = LeadForm::new(client_for(&server), Session::ephemeral())
            .with_ack_duration(Duration::from_millis(10));
        form.set_draft(LeadDraft::new("A", "1"));

        assert!(form.submit().await.is_err());
        assert!(matches!(
            form.submit().await.unwrap(),
            SubmitOutcome::Confirmed(_)
        ));
        assert!(form.state().error.is_none());
    }

    #[tokio::test]
    async fn test_resubmit_while_pending_sends_once() {
        let server = MockServer::start().await;
        mount_leads(
            &server,
            ResponseTemplate::new(201)
                .set_body_json(lead_body())
                .set_delay(Duration::from_millis(300)),
            1,
        )
        .await;

        let form = Arc::new(
            LeadForm::new(client_for(&server), Session::ephemeral())
                .with_ack_duration(Duration::from_millis(10)),
        );
        form.set_draft(LeadDraft::new("A", "1"));

        let first = tokio::spawn({
            let form = Arc::clone(&form);
            async move { form.submit().await }
        });
        wait_until(|| form.is_pending()).await;

        let second = form.submit().await.unwrap();
        assert_eq!(second, SubmitOutcome::AlreadyPending);

        assert!(matches!(
            first.await.unwrap().unwrap(),
            SubmitOutcome::Confirmed(_)
        ));
    }
}

// =============================================================================
// Optimistic modal
// =============================================================================

mod brochure_modal {
    use super::*;

    #[tokio::test]
    async fn test_reports_optimistic_policy() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let modal = BrochureModal::new(
            client_for(&server),
            Session::ephemeral(),
            Arc::new(bundled_brochure(&dir)),
        );
        assert_eq!(LeadCapture::policy(&modal), WritePolicy::Optimistic);
    }

    #[tokio::test]
    async fn test_missing_name_prompts_without_delivery() {
        let server = MockServer::start().await;
        mount_leads(&server, ResponseTemplate::new(201), 0).await;

        let deliverable = Arc::new(CountingDeliverable {
            calls: AtomicUsize::new(0),
        });
        let modal = BrochureModal::new(
            client_for(&server),
            Session::ephemeral(),
            deliverable.clone(),
        );
        modal.set_draft(LeadDraft::new("", "1"));

        let err = modal.submit().await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(modal.state().error.as_deref(), Some(MISSING_FIELDS_PROMPT));
        assert_eq!(deliverable.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_shown_before_server_answers() {
        let server = MockServer::start().await;
        // Answers long after the observation window
        mount_leads(
            &server,
            ResponseTemplate::new(201)
                .set_body_json(lead_body())
                .set_delay(Duration::from_secs(30)),
            1,
        )
        .await;

        let dir = TempDir::new().unwrap();
        let modal = BrochureModal::new(
            client_for(&server),
            Session::ephemeral(),
            Arc::new(bundled_brochure(&dir)),
        )
        .with_reset_delay(Duration::from_secs(60));
        modal.open();
        modal.set_draft(LeadDraft::new("A", "1"));

        let outcome = tokio::time::timeout(Duration::from_secs(2), modal.submit())
            .await
            .expect("submit must not wait for the server")
            .unwrap();

        let SubmitOutcome::Delivered(dest) = outcome else {
            panic!("expected a delivered brochure");
        };
        assert!(dest.ends_with(BROCHURE_FILE_NAME));
        assert!(dest.exists());

        let state = modal.state();
        assert!(state.submitted);
        assert!(state.open);
        assert!(state.error.is_none());

        // The request did go out, it just has not been answered
        wait_for_requests(&server, 1).await;
    }

    #[tokio::test]
    async fn test_background_failure_is_not_surfaced() {
        let server = MockServer::start().await;
        mount_leads(&server, ResponseTemplate::new(500), 1).await;

        let dir = TempDir::new().unwrap();
        let modal = BrochureModal::new(
            client_for(&server),
            Session::ephemeral(),
            Arc::new(bundled_brochure(&dir)),
        )
        .with_reset_delay(Duration::from_millis(100));
        modal.open();
        modal.set_draft(LeadDraft::new("A", "1"));

        assert!(matches!(
            modal.submit().await.unwrap(),
            SubmitOutcome::Delivered(_)
        ));

        // Resets and closes on its own
        wait_until(|| {
            let state = modal.state();
            !state.open && !state.submitted
        })
        .await;

        let state = modal.state();
        assert!(state.error.is_none());
        assert_eq!(state.draft, LeadDraft::default());

        wait_for_requests(&server, 1).await;
    }

    #[tokio::test]
    async fn test_resubmit_while_showing_success() {
        let server = MockServer::start().await;
        mount_leads(&server, ResponseTemplate::new(201).set_body_json(lead_body()), 1).await;

        let deliverable = Arc::new(CountingDeliverable {
            calls: AtomicUsize::new(0),
        });
        let modal = BrochureModal::new(
            client_for(&server),
            Session::ephemeral(),
            deliverable.clone(),
        )
        .with_reset_delay(Duration::from_secs(60));
        modal.set_draft(LeadDraft::new("A", "1"));

        assert!(matches!(
            modal.submit().await.unwrap(),
            SubmitOutcome::Delivered(_)
        ));
        assert_eq!(modal.submit().await.unwrap(), SubmitOutcome::AlreadyPending);
        assert_eq!(deliverable.calls.load(Ordering::SeqCst), 1);

        wait_for_requests(&server, 1).await;
    }

    #[tokio::test]
    async fn test_failed_delivery_sends_no_lead() {
        let server = MockServer::start().await;
        mount_leads(&server, ResponseTemplate::new(201), 0).await;

        let dir = TempDir::new().unwrap();
        let missing = FileDeliverable::new(dir.path().join("missing.pdf"), dir.path());
        let modal = BrochureModal::new(client_for(&server), Session::ephemeral(), Arc::new(missing));
        modal.set_draft(LeadDraft::new("A", "1"));

        let err = modal.submit().await.unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));

        let state = modal.state();
        assert!(!state.submitted);
        assert_eq!(state.error.as_deref(), Some(SUBMISSION_FAILED_MESSAGE));
        assert_eq!(state.draft, LeadDraft::new("A", "1"));

        // Not left busy: a second attempt tries again
        assert!(modal.submit().await.is_err());
    }

    #[tokio::test]
    async fn test_cancelled_delivery_releases_modal() {
        let server = MockServer::start().await;
        mount_leads(&server, ResponseTemplate::new(201), 0).await;

        let modal = BrochureModal::new(
            client_for(&server),
            Session::ephemeral(),
            Arc::new(StalledDeliverable),
        );
        modal.set_draft(LeadDraft::new("A", "1"));

        let cancelled = tokio::time::timeout(Duration::from_millis(100), modal.submit()).await;
        assert!(cancelled.is_err());
        assert!(!modal.state().submitted);

        // Busy flag was released, so the next attempt reaches the deliverable again
        let retry = tokio::time::timeout(Duration::from_millis(100), modal.submit()).await;
        assert!(retry.is_err(), "a busy modal would have answered AlreadyPending");
    }

    #[tokio::test]
    async fn test_gated_brochure_then_lead() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/brochure"))
            .and(header("authorization", "Bearer tok-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        mount_leads(&server, ResponseTemplate::new(201).set_body_json(lead_body()), 1).await;

        let client = client_for(&server);
        let session = Session::ephemeral();
        session
            .sign_in(
                "tok-abc".to_string(),
                serde_json::from_value(json!({
                    "id": "user-1", "name": "Asha", "email": "asha@example.com"
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        let dir = TempDir::new().unwrap();
        let deliverable = ServerDeliverable::new(client.clone(), session.clone(), dir.path());
        let modal = BrochureModal::new(client, session, Arc::new(deliverable));
        modal.set_draft(LeadDraft::new("A", "1"));

        let SubmitOutcome::Delivered(dest) = modal.submit().await.unwrap() else {
            panic!("expected a delivered brochure");
        };
        assert_eq!(std::fs::read(dest).unwrap(), b"%PDF-1.4");

        wait_for_requests(&server, 2).await;
    }
}
