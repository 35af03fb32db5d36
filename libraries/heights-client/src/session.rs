//! Signed-in session state.
//!
//! A [`Session`] is an explicit, cloneable context handed to every request
//! that needs credentials. Its token and user snapshot are persisted through a
//! [`SessionStore`] so they survive restarts, the way a browser keeps them in
//! local storage.

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use heights_core::UserProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Token plus the user it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: UserProfile,
}

/// Persistence for a single session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the saved session, `None` when signed out.
    async fn load(&self) -> Result<Option<StoredSession>>;

    async fn save(&self, session: &StoredSession) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// JSON file on disk.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<StoredSession>> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&contents)
            .map(Some)
            .map_err(|e| ClientError::Session(format!("{}: {}", self.path.display(), e)))
    }

    async fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, for tests and ephemeral clients.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn save(&self, session: &StoredSession) -> Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Current sign-in state, shared by clones.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
    current: Arc<RwLock<Option<StoredSession>>>,
}

impl Session {
    /// A signed-out session backed by `store`.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Signed-out session with nothing persisted.
    pub fn ephemeral() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Reattach whatever `store` holds.
    ///
    /// The token is not checked against the server. An unreadable session is
    /// treated as signed out.
    pub async fn restore(store: Arc<dyn SessionStore>) -> Self {
        let current = match store.load().await {
            Ok(Some(saved)) => {
                debug!(user_id = %saved.user.id, "Restored session");
                Some(saved)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable stored session");
                None
            }
        };

        Self {
            store,
            current: Arc::new(RwLock::new(current)),
        }
    }

    /// Persist and adopt a freshly issued token.
    pub async fn sign_in(&self, token: String, user: UserProfile) -> Result<()> {
        let session = StoredSession { token, user };
        self.store.save(&session).await?;

        info!(user_id = %session.user.id, "Signed in");
        *self.current.write().await = Some(session);
        Ok(())
    }

    /// Forget the token locally. The server keeps no session to revoke.
    pub async fn sign_out(&self) -> Result<()> {
        // Drop the in-memory token first so no later request carries it
        *self.current.write().await = None;
        self.store.clear().await?;
        info!("Signed out");
        Ok(())
    }

    pub async fn token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn user(&self) -> Option<UserProfile> {
        self.current.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heights_core::UserId;
    use tempfile::TempDir;

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new("user-1"),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert!(store.load().await.unwrap().is_none());

        let saved = StoredSession {
            token: "abc".to_string(),
            user: profile(),
        };
        store.save(&saved).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(saved));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        // Clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_restore_reattaches_saved_session() {
        let store = Arc::new(MemorySessionStore::new());
        store
            .save(&StoredSession {
                token: "abc".to_string(),
                user: profile(),
            })
            .await
            .unwrap();

        let session = Session::restore(store).await;
        assert_eq!(session.token().await.as_deref(), Some("abc"));
        assert_eq!(session.user().await.unwrap().name, "Asha");
    }

    #[tokio::test]
    async fn test_restore_corrupt_file_is_signed_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{ definitely not a session").unwrap();

        let session = Session::restore(Arc::new(FileSessionStore::new(&path))).await;
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_sign_out_clears_store_and_clones() {
        let store = Arc::new(MemorySessionStore::new());
        let session = Session::new(store.clone());
        let other = session.clone();

        session.sign_in("abc".to_string(), profile()).await.unwrap();
        assert!(other.is_authenticated().await);

        other.sign_out().await.unwrap();
        assert!(session.token().await.is_none());
        assert!(store.load().await.unwrap().is_none());
    }
}
