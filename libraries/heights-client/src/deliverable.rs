//! Local deliverables handed to a visitor on submit.

use crate::client::HeightsClient;
use crate::error::Result;
use crate::session::Session;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// Name the brochure is saved under
pub const BROCHURE_FILE_NAME: &str = "Centrum Heights Brochure.pdf";

/// Something placed on the visitor's machine, e.g. a downloaded brochure.
#[async_trait]
pub trait Deliverable: Send + Sync {
    /// Deliver and return where the result landed.
    async fn deliver(&self) -> Result<PathBuf>;
}

/// Copies a bundled file into a download directory.
pub struct FileDeliverable {
    source: PathBuf,
    download_dir: PathBuf,
    file_name: String,
}

impl FileDeliverable {
    pub fn new(source: impl Into<PathBuf>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            download_dir: download_dir.into(),
            file_name: BROCHURE_FILE_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }
}

#[async_trait]
impl Deliverable for FileDeliverable {
    async fn deliver(&self) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.download_dir).await?;

        let dest = self.download_dir.join(&self.file_name);
        let size = tokio::fs::copy(&self.source, &dest).await?;

        info!(dest = %dest.display(), size, "Brochure saved");
        Ok(dest)
    }
}

/// Fetches the brochure from `GET /api/brochure` with the session's token.
pub struct ServerDeliverable {
    client: HeightsClient,
    session: Session,
    download_dir: PathBuf,
}

impl ServerDeliverable {
    pub fn new(client: HeightsClient, session: Session, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            session,
            download_dir: download_dir.into(),
        }
    }
}

#[async_trait]
impl Deliverable for ServerDeliverable {
    async fn deliver(&self) -> Result<PathBuf> {
        let dest = self.download_dir.join(BROCHURE_FILE_NAME);
        self.client
            .download_brochure(&self.session, &dest, |_| {})
            .await?;
        Ok(dest)
    }
}
