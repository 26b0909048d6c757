use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use track_core::SessionToken;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of the signed-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: SessionToken,
    pub saved_at: DateTime<Utc>,
}

/// Keeps the session token outside the in-memory store so it survives restarts.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load_session(&self) -> Result<Option<SessionRecord>, StorageError>;

    /// Persist the session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn save_session(&self, record: &SessionRecord) -> Result<(), StorageError>;

    /// Forget the persisted session. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear_session(&self) -> Result<(), StorageError>;

    /// Convenience accessor for the bearer token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load_token(&self) -> Result<Option<SessionToken>, StorageError> {
        Ok(self.load_session().await?.map(|record| record.token))
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    session: Arc<Mutex<Option<SessionRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemoryRepository {
    async fn load_session(&self) -> Result<Option<SessionRecord>, StorageError> {
        let guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(record.clone());
        Ok(())
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemoryRepository::new());
        Self { sessions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use track_core::time::fixed_now;

    fn record(token: &str) -> SessionRecord {
        SessionRecord {
            token: SessionToken::new(token).unwrap(),
            saved_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn save_load_clear_session() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_session().await.unwrap().is_none());

        repo.save_session(&record("abc")).await.unwrap();
        repo.save_session(&record("def")).await.unwrap();
        let token = repo.load_token().await.unwrap().unwrap();
        assert_eq!(token.as_str(), "def");

        repo.clear_session().await.unwrap();
        repo.clear_session().await.unwrap();
        assert!(repo.load_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn storage_clones_share_state() {
        let storage = Storage::in_memory();
        let other = storage.clone();
        storage.sessions.save_session(&record("shared")).await.unwrap();
        assert!(other.sessions.load_session().await.unwrap().is_some());
    }
}
