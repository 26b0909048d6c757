use std::sync::Arc;

use storage::repository::{SessionRecord, SessionStore};
use track_core::SessionToken;
use track_core::model::NoticeLevel;

use crate::error::ServiceError;
use crate::store::{AuthAction, Outcome, ProgressAction, Store};

pub(crate) const SESSION_EXPIRED: &str = "Session expired. Please log in again.";

/// Keeps the persisted token and the auth slice in step.
#[derive(Clone)]
pub struct SessionKeeper {
    store: Store,
    sessions: Arc<dyn SessionStore>,
}

impl SessionKeeper {
    #[must_use]
    pub fn new(store: Store, sessions: Arc<dyn SessionStore>) -> Self {
        Self { store, sessions }
    }

    /// Token to send as bearer credentials, read from the session store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotSignedIn` when no token is persisted and
    /// `ServiceError::Storage` if the store cannot be read.
    pub async fn bearer(&self) -> Result<SessionToken, ServiceError> {
        self.sessions
            .load_token()
            .await?
            .ok_or(ServiceError::NotSignedIn)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store cannot be read.
    pub async fn stored_token(&self) -> Result<Option<SessionToken>, ServiceError> {
        Ok(self.sessions.load_token().await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the token cannot be written.
    pub async fn persist(&self, token: &SessionToken) -> Result<(), ServiceError> {
        let record = SessionRecord {
            token: token.clone(),
            saved_at: self.store.clock().now(),
        };
        self.sessions.save_session(&record).await?;
        Ok(())
    }

    /// Removes the persisted token and empties the auth and progress slices.
    ///
    /// The slices are cleared even when the store fails, so the client never
    /// keeps acting on a session it tried to end.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the token cannot be removed.
    pub async fn end(&self, error: Option<String>) -> Result<(), ServiceError> {
        let cleared = self.sessions.clear_session().await;
        self.store.dispatch(AuthAction::SessionCleared { error });
        self.store.dispatch(ProgressAction::Cleared);
        cleared?;
        Ok(())
    }

    /// Ends the session held under `token` after its user could not be
    /// resolved. Does nothing when the session has since been replaced, so a
    /// late failure never clears a newer sign-in. Returns whether it ended.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the token cannot be removed; the
    /// slices are cleared regardless.
    pub async fn end_if_current(
        &self,
        token: &SessionToken,
        error: String,
    ) -> Result<bool, ServiceError> {
        let cleared = self.store.dispatch(AuthAction::UserFetchFailed {
            token: token.clone(),
            error,
        });
        if cleared == Outcome::Skipped {
            return Ok(false);
        }
        self.store.dispatch(ProgressAction::Cleared);
        if self.sessions.load_token().await?.as_ref() == Some(token) {
            self.sessions.clear_session().await?;
        }
        Ok(true)
    }

    /// Ends the session after the server refused the token.
    pub async fn expire(&self) {
        tracing::info!("session token rejected by the server; signing out");
        if let Err(err) = self.end(Some(SESSION_EXPIRED.to_owned())).await {
            tracing::warn!(error = %err, "failed to clear persisted session");
        }
        self.store.notify(NoticeLevel::Error, SESSION_EXPIRED);
    }

    /// Maps an API failure on an authenticated call, expiring the session
    /// first when the server answered 401.
    pub(crate) async fn reject(
        &self,
        source: crate::error::ApiError,
        fallback: &str,
    ) -> ServiceError {
        if source.is_unauthorized() {
            self.expire().await;
        }
        ServiceError::rejected(source, fallback)
    }
}
