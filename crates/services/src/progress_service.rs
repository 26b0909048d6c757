use std::sync::Arc;

use tokio::task::JoinHandle;
use track_core::model::{NoticeLevel, ProgressEntry, ProgressKey, ProgressStatus, ProgressSummary};
use track_core::{SessionToken, ToggleError, ToggleTicket};

use crate::api::Backend;
use crate::error::{ApiError, ServiceError};
use crate::session::SessionKeeper;
use crate::store::{Outcome, ProgressAction, Store};

const UPDATE_FAILED: &str = "Failed to update progress";

/// How a toggle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Another update for the same key was still in flight; nothing was sent.
    Busy,
    /// The server accepted the new status.
    Synced(ProgressStatus),
    /// The write failed and the entry was rolled back to `restored`
    /// (`None`: the entry was removed again).
    Reverted {
        restored: Option<ProgressStatus>,
        message: String,
    },
}

/// Progress fetching and the optimistic toggle.
#[derive(Clone)]
pub struct ProgressService {
    store: Store,
    backend: Arc<dyn Backend>,
    session: SessionKeeper,
}

impl ProgressService {
    #[must_use]
    pub fn new(store: Store, backend: Arc<dyn Backend>, session: SessionKeeper) -> Self {
        Self {
            store,
            backend,
            session,
        }
    }

    /// Replaces the local entries with `GET /progress/`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotSignedIn` without a token, or
    /// `ServiceError::Rejected` if the request fails. A 401 also ends the
    /// session.
    pub async fn fetch_progress(&self) -> Result<usize, ServiceError> {
        let token = self.bearer().await?;
        self.store.dispatch(ProgressAction::Pending);
        match self.backend.progress(&token).await {
            Ok(entries) => {
                let count = entries.len();
                tracing::debug!(count, "progress loaded");
                self.store.dispatch(ProgressAction::Loaded(entries));
                Ok(count)
            }
            Err(source) => Err(self.fail(source, "Failed to fetch progress").await),
        }
    }

    /// Loads the authoritative summary from `GET /progress/summary`.
    ///
    /// # Errors
    ///
    /// Same as [`ProgressService::fetch_progress`].
    pub async fn fetch_summary(&self) -> Result<Option<ProgressSummary>, ServiceError> {
        let token = self.bearer().await?;
        self.store.dispatch(ProgressAction::Pending);
        match self.backend.progress_summary(&token).await {
            Ok(summary) => {
                self.store.dispatch(ProgressAction::SummaryLoaded(summary));
                Ok(summary)
            }
            Err(source) => Err(self.fail(source, "Failed to fetch progress summary").await),
        }
    }

    /// Sets a status locally without contacting the server.
    pub fn set_local(&self, key: ProgressKey, status: ProgressStatus) {
        self.store.dispatch(ProgressAction::LocalSet { key, status });
    }

    /// Applies the optimistic flip for `key` and locks it.
    ///
    /// # Errors
    ///
    /// Returns `ToggleError::InFlight` if an update for `key` is outstanding.
    pub fn begin_toggle(&self, key: ProgressKey) -> Result<ToggleTicket, ToggleError> {
        match self.store.dispatch(ProgressAction::ToggleRequested(key.clone())) {
            Outcome::ToggleStarted(ticket) => {
                tracing::debug!(%key, target = %ticket.target(), "optimistic toggle applied");
                Ok(ticket)
            }
            Outcome::ToggleRefused(err) => Err(err),
            _ => Err(ToggleError::InFlight(key)),
        }
    }

    /// Sends the write for a started toggle and settles or rolls it back.
    pub async fn finish_toggle(&self, ticket: ToggleTicket) -> ToggleOutcome {
        let entry = ProgressEntry::new(ticket.key().clone(), ticket.target());
        let token = match self.bearer().await {
            Ok(token) => token,
            Err(err) => return self.roll_back(ticket, err.user_message()),
        };

        match self.backend.update_progress(&token, &entry).await {
            Ok(progress) => {
                let target = ticket.target();
                self.store.dispatch(ProgressAction::ToggleSettled { ticket, progress });
                ToggleOutcome::Synced(target)
            }
            Err(source) => {
                let unauthorized = source.is_unauthorized();
                let message = source.user_message(UPDATE_FAILED);
                tracing::warn!(key = %entry.key, error = %source, "progress update failed");
                let outcome = self.roll_back(ticket, message);
                if unauthorized {
                    self.session.expire().await;
                }
                outcome
            }
        }
    }

    /// Flips `key` and waits for the server. A toggle on a key that is
    /// still in flight is dropped and reported as `Busy`.
    pub async fn toggle(&self, key: ProgressKey) -> ToggleOutcome {
        match self.begin_toggle(key) {
            Ok(ticket) => self.finish_toggle(ticket).await,
            Err(err) => {
                tracing::debug!(error = %err, "toggle dropped");
                ToggleOutcome::Busy
            }
        }
    }

    /// Applies the flip now and runs the write on the tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ToggleError::InFlight` if an update for `key` is outstanding.
    pub fn spawn_toggle(&self, key: ProgressKey) -> Result<JoinHandle<ToggleOutcome>, ToggleError> {
        let ticket = self.begin_toggle(key)?;
        let service = self.clone();
        Ok(tokio::spawn(async move { service.finish_toggle(ticket).await }))
    }

    pub fn clear_error(&self) {
        self.store.dispatch(ProgressAction::ClearError);
    }

    async fn bearer(&self) -> Result<SessionToken, ServiceError> {
        self.session.bearer().await
    }

    fn roll_back(&self, ticket: ToggleTicket, message: String) -> ToggleOutcome {
        let key = ticket.key().clone();
        let outcome = self.store.dispatch(ProgressAction::ToggleFailed {
            ticket,
            message: message.clone(),
        });
        self.store.notify(NoticeLevel::Error, message.clone());
        match outcome {
            Outcome::Reverted(restored) => {
                tracing::info!(%key, ?restored, "optimistic toggle rolled back");
                ToggleOutcome::Reverted { restored, message }
            }
            other => {
                tracing::warn!(%key, ?other, "rollback found no pending write");
                ToggleOutcome::Reverted {
                    restored: None,
                    message,
                }
            }
        }
    }

    async fn fail(&self, source: ApiError, fallback: &str) -> ServiceError {
        let err = self.session.reject(source, fallback).await;
        tracing::warn!(error = %err, "progress request rejected");
        self.store.dispatch(ProgressAction::Rejected(err.user_message()));
        self.store.notify(NoticeLevel::Error, err.user_message());
        err
    }
}
