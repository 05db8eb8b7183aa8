//! Session key-value store.
//!
//! Holds small string values across screens and, with the file backend,
//! across CLI invocations. The signed-in user lives under
//! [`keys::CURRENT_USER`] as one JSON blob; logging out clears every key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::models::user::User;

/// Session keys.
pub mod keys {
    /// Key for the signed-in user.
    pub const CURRENT_USER: &str = "user";
}

/// Errors from the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the session file failed.
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value is not valid JSON for the requested type.
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug)]
enum Backend {
    Memory,
    File(PathBuf),
}

/// Key-value session storage.
///
/// Cheap to clone; clones share the same entries.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

#[derive(Debug)]
struct SessionStoreInner {
    backend: Backend,
    entries: Mutex<BTreeMap<String, String>>,
}

impl SessionStore {
    /// A session that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_backend(Backend::Memory, BTreeMap::new())
    }

    /// Open a session persisted as JSON at `path`. A missing file is an empty
    /// session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Io` if the file exists but cannot be read, or
    /// `SessionError::Serialization` if it is not a JSON object of strings.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "Session loaded");
        Ok(Self::with_backend(Backend::File(path), entries))
    }

    fn with_backend(backend: Backend, entries: BTreeMap<String, String>) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                backend,
                entries: Mutex::new(entries),
            }),
        }
    }

    /// Location of the session file, if file-backed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.inner.backend {
            Backend::Memory => None,
            Backend::File(path) => Some(path),
        }
    }

    /// Read a value.
    pub async fn get_item(&self, key: &str) -> Option<String> {
        self.inner.entries.lock().await.get(key).cloned()
    }

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Io` if the session file cannot be written.
    pub async fn set_item(&self, key: &str, value: String) -> Result<(), SessionError> {
        let mut entries = self.inner.entries.lock().await;
        entries.insert(key.to_owned(), value);
        self.persist(&entries).await
    }

    /// Remove a value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Io` if the session file cannot be written.
    pub async fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.inner.entries.lock().await;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }

    /// Remove every value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Io` if the session file cannot be written.
    pub async fn clear(&self) -> Result<(), SessionError> {
        let mut entries = self.inner.entries.lock().await;
        entries.clear();
        self.persist(&entries).await
    }

    /// Read and decode a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Serialization` if the stored value does not
    /// decode as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        self.get_item(key)
            .await
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(Into::into)
    }

    /// Encode and write a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if encoding or persisting fails.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), SessionError> {
        self.set_item(key, serde_json::to_string(value)?).await
    }

    /// The signed-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Serialization` if the stored user is corrupt.
    pub async fn current_user(&self) -> Result<Option<User>, SessionError> {
        self.get_json(keys::CURRENT_USER).await
    }

    /// Remember `user` as signed in.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the user cannot be stored.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn sign_in(&self, user: &User) -> Result<(), SessionError> {
        self.set_json(keys::CURRENT_USER, user).await
    }

    /// Forget the signed-in user along with everything else in the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Io` if the session file cannot be written.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.clear().await
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        let Backend::File(path) = &self.inner.backend else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_vec_pretty(entries)?).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartwheel_core::{Email, SubscriptionType, UserId};

    use super::*;

    fn user() -> User {
        User {
            id: UserId::new(3),
            username: "ana".into(),
            email: Email::parse("ana@example.com").unwrap(),
            subscription_type: SubscriptionType::Random,
            subscription_days: None,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "cartwheel-session-{name}-{}.json",
            std::process::id()
        ))
    }

    #[tokio::test]
    async fn test_items() {
        let session = SessionStore::in_memory();
        assert!(session.get_item("k").await.is_none());

        session.set_item("k", "v".into()).await.unwrap();
        assert_eq!(session.get_item("k").await.as_deref(), Some("v"));

        session.remove_item("k").await.unwrap();
        assert!(session.get_item("k").await.is_none());
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let session = SessionStore::in_memory();
        assert!(session.current_user().await.unwrap().is_none());

        session.sign_in(&user()).await.unwrap();
        session.set_item("other", "x".into()).await.unwrap();
        assert_eq!(session.current_user().await.unwrap(), Some(user()));

        session.sign_out().await.unwrap();
        assert!(session.current_user().await.unwrap().is_none());
        assert!(session.get_item("other").await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_user_blob() {
        let session = SessionStore::in_memory();
        session
            .set_item(keys::CURRENT_USER, "{not json".into())
            .await
            .unwrap();
        assert!(matches!(
            session.current_user().await,
            Err(SessionError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_file_backend_survives_reopen() {
        let path = temp_path("reopen");
        let _ = tokio::fs::remove_file(&path).await;

        let session = SessionStore::open(&path).await.unwrap();
        session.sign_in(&user()).await.unwrap();

        let reopened = SessionStore::open(&path).await.unwrap();
        assert_eq!(reopened.current_user().await.unwrap(), Some(user()));
        assert_eq!(reopened.path(), Some(path.as_path()));

        reopened.sign_out().await.unwrap();
        let cleared = SessionStore::open(&path).await.unwrap();
        assert!(cleared.current_user().await.unwrap().is_none());

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
