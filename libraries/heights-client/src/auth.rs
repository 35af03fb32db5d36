//! Authentication endpoints.

use crate::client::{error_from_response, parse_json, send_error};
use crate::error::{ClientError, Result};
use heights_core::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Authentication client for the lead API.
///
/// Only talks to the server; [`crate::HeightsClient::login`] is the variant
/// that also updates a session.
pub struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Exchange email and password for a token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let url = format!("{}/api/auth/login", self.base_url);
        debug!(url = %url, email = %email, "Attempting login");

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            if let ClientError::AuthFailed(message) = &err {
                warn!(error = %message, "Login failed: invalid credentials");
            }
            return Err(err);
        }

        let auth: AuthResponse = parse_json(response, "login").await?;
        info!(user_id = %auth.user.id, "Login successful");
        Ok(auth)
    }

    /// Create an account; the response already carries a token.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let url = format!("{}/api/auth/register", self.base_url);
        debug!(url = %url, email = %email, "Registering account");

        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let auth: AuthResponse = parse_json(response, "registration").await?;
        info!(user_id = %auth.user.id, "Registration successful");
        Ok(auth)
    }

    /// Get the user a token belongs to.
    pub async fn current_user(&self, token: &str) -> Result<UserProfile> {
        let url = format!("{}/api/auth/me", self.base_url);
        debug!(url = %url, "Getting current user info");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        parse_json(response, "user").await
    }

    /// Whether the server still accepts a token.
    pub async fn validate_token(&self, token: &str) -> Result<bool> {
        match self.current_user(token).await {
            Ok(_) => Ok(true),
            Err(ClientError::AuthFailed(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
