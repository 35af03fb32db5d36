//! Types for the Centrum Heights client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for connecting to the lead API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the server (e.g., "https://api.centrumheights.com")
    pub url: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a new config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `GET /api/health` response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthInfo {
    pub status: String,
    pub version: String,
}

/// Progress information during a brochure download.
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    pub bytes_received: u64,
    pub bytes_total: Option<u64>,
    /// Progress as 0.0 to 1.0
    pub progress: f32,
}
