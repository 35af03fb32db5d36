//! Main Centrum Heights API client.

use crate::auth::AuthClient;
use crate::download::DownloadClient;
use crate::error::{ClientError, Result};
use crate::session::Session;
use crate::types::{ClientConfig, DownloadProgress, HealthInfo};
use heights_core::{
    EmailRequest, Lead, LeadCreatedResponse, LeadSubmission, MessageResponse, UserProfile,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Client for the lead API.
///
/// Cheap to clone; clones share the connection pool. Credentials are never
/// stored on the client itself: every call that may need them takes the
/// [`Session`] explicitly.
///
/// # Example
///
/// ```ignore
/// use heights_client::{ClientConfig, HeightsClient, Session};
///
/// let client = HeightsClient::new(ClientConfig::new("https://api.example.com"))?;
/// let session = Session::ephemeral();
///
/// client.login(&session, "buyer@example.com", "password").await?;
/// client.download_brochure(&session, "Brochure.pdf".as_ref(), |_| {}).await?;
/// ```
#[derive(Clone)]
pub struct HeightsClient {
    http: Client,
    base_url: Arc<str>,
}

impl HeightsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = normalize_url(&config.url)?;

        // Create HTTP client with reasonable defaults
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("CentrumHeights/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Get the server URL.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Authentication endpoints without session bookkeeping.
    pub fn auth(&self) -> AuthClient<'_> {
        AuthClient::new(&self.http, &self.base_url)
    }

    /// Check that the server is up. No authentication needed.
    pub async fn health(&self) -> Result<HealthInfo> {
        let url = format!("{}/api/health", self.base_url);
        debug!(url = %url, "Checking server health");

        let response = self.http.get(&url).send().await.map_err(send_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        parse_json(response, "health").await
    }

    /// Log in and store the issued token in `session`.
    pub async fn login(&self, session: &Session, email: &str, password: &str) -> Result<UserProfile> {
        let auth = self.auth().login(email, password).await?;
        session.sign_in(auth.token, auth.user.clone()).await?;
        Ok(auth.user)
    }

    /// Create an account and store the issued token in `session`.
    pub async fn register(
        &self,
        session: &Session,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile> {
        let auth = self.auth().register(name, email, password).await?;
        session.sign_in(auth.token, auth.user.clone()).await?;
        Ok(auth.user)
    }

    /// Sign out locally.
    pub async fn logout(&self, session: &Session) -> Result<()> {
        session.sign_out().await
    }

    /// Fetch the signed-in user from the server.
    pub async fn current_user(&self, session: &Session) -> Result<UserProfile> {
        let token = session.token().await.ok_or(ClientError::AuthRequired)?;
        self.auth().current_user(&token).await
    }

    /// Create a lead and wait for the server to confirm it.
    pub async fn submit_lead(&self, session: &Session, submission: &LeadSubmission) -> Result<Lead> {
        let url = format!("{}/api/leads", self.base_url);
        debug!(url = %url, "Submitting lead");

        let request = self.with_session(session, self.http.post(&url)).await;
        let response = request.json(submission).send().await.map_err(send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let created: LeadCreatedResponse = parse_json(response, "lead").await?;
        info!(lead_id = %created.new_lead.id, "Lead accepted");
        Ok(created.new_lead)
    }

    /// Send a diagnostic email through the server's notifier.
    pub async fn send_test_email(
        &self,
        session: &Session,
        to: &str,
        subject: &str,
        text: &str,
    ) -> Result<()> {
        let url = format!("{}/api/test/email", self.base_url);
        let body = EmailRequest {
            to: to.to_string(),
            subject: subject.to_string(),
            text: text.to_string(),
        };

        let request = self.with_session(session, self.http.post(&url)).await;
        let response = request.json(&body).send().await.map_err(send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let ack: MessageResponse = parse_json(response, "email").await?;
        debug!(message = %ack.message, "Test email accepted");
        Ok(())
    }

    /// Download the brochure to `dest`. Requires a signed-in session.
    ///
    /// Returns the number of bytes written.
    pub async fn download_brochure<F>(
        &self,
        session: &Session,
        dest: &Path,
        progress_callback: F,
    ) -> Result<u64>
    where
        F: FnMut(DownloadProgress),
    {
        let token = session.token().await.ok_or(ClientError::AuthRequired)?;
        DownloadClient::new(&self.http, &self.base_url, &token)
            .download_brochure(dest, progress_callback)
            .await
    }

    /// Attach the session's bearer token, if any.
    async fn with_session(&self, session: &Session, request: RequestBuilder) -> RequestBuilder {
        match session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Validate a base URL and strip trailing slashes.
fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
    }

    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ClientError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }

    url::Url::parse(trimmed).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

    Ok(trimmed.trim_end_matches('/').to_string())
}

pub(crate) fn send_error(e: reqwest::Error) -> ClientError {
    if e.is_connect() {
        ClientError::ServerUnreachable(e.to_string())
    } else {
        ClientError::Request(e)
    }
}

/// Turn a non-success response into an error, keeping the server's `message`.
pub(crate) async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    // Only a JSON `{message}` is shown to users; proxy pages and the like are not
    let message = serde_json::from_str::<MessageResponse>(&body)
        .map(|m| m.message)
        .unwrap_or_else(|_| {
            tracing::debug!(status = %status, body = %body, "Error response without a message");
            String::new()
        });

    if status == StatusCode::UNAUTHORIZED {
        ClientError::AuthFailed(message)
    } else {
        ClientError::ServerError {
            status: status.as_u16(),
            message,
        }
    }
}

pub(crate) async fn parse_json<T: serde::de::DeserializeOwned>(
    response: Response,
    what: &str,
) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse {} response: {}", what, e)))
}
