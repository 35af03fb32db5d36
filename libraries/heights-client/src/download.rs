//! Brochure download.

use crate::client::{error_from_response, send_error};
use crate::error::{ClientError, Result};
use crate::types::DownloadProgress;
use futures_util::StreamExt;
use reqwest::Client;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Download client for the gated brochure.
pub struct DownloadClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> DownloadClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// Stream the brochure PDF into `dest_path`.
    ///
    /// Nothing is written unless the server accepts the token.
    pub async fn download_brochure<F>(&self, dest_path: &Path, mut progress_callback: F) -> Result<u64>
    where
        F: FnMut(DownloadProgress),
    {
        let url = format!("{}/api/brochure", self.base_url);
        debug!(url = %url, dest = %dest_path.display(), "Downloading brochure");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        // Get content length if available
        let total_size = response.content_length();

        // Create parent directories if needed
        if let Some(parent) = dest_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = File::create(dest_path).await?;
        let mut downloaded: u64 = 0;

        // Stream the response body
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(ClientError::Request)?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            let progress = total_size
                .map(|total| downloaded as f32 / total as f32)
                .unwrap_or(0.0);

            progress_callback(DownloadProgress {
                bytes_received: downloaded,
                bytes_total: total_size,
                progress,
            });
        }

        file.flush().await?;

        info!(
            dest = %dest_path.display(),
            size = downloaded,
            "Brochure downloaded"
        );

        Ok(downloaded)
    }
}
