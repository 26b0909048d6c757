//! Application-state container.
//!
//! One `Store` is created by the composition root and handed to every
//! service. State changes only through [`Store::dispatch`], which routes a
//! typed [`Action`] to the reducer of the slice it targets (`notify` and
//! `take_notices` are shorthands for the notice board). The lock is held
//! for the reducer call only, never across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use track_core::model::{NoticeBoard, NoticeId, NoticeLevel, ProgressStatus};
use track_core::{Clock, SessionToken, ToggleError, ToggleTicket};

mod auth;
mod progress;
mod topics;

pub use auth::{AuthAction, AuthState};
pub use progress::{ProgressAction, ProgressState};
pub use topics::{TopicAction, TopicState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub auth: AuthState,
    pub topics: TopicState,
    pub progress: ProgressState,
    pub notices: NoticeBoard,
}

impl AppState {
    #[must_use]
    pub fn new(notice_ttl: Duration) -> Self {
        Self {
            auth: AuthState::default(),
            topics: TopicState::default(),
            progress: ProgressState::default(),
            notices: NoticeBoard::new(notice_ttl),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Duration::seconds(NoticeBoard::DEFAULT_TTL_SECS))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Auth(AuthAction),
    Topics(TopicAction),
    Progress(ProgressAction),
    Notify {
        level: NoticeLevel,
        message: String,
        at: DateTime<Utc>,
    },
    DismissNotice(NoticeId),
}

impl From<AuthAction> for Action {
    fn from(action: AuthAction) -> Self {
        Action::Auth(action)
    }
}

impl From<TopicAction> for Action {
    fn from(action: TopicAction) -> Self {
        Action::Topics(action)
    }
}

impl From<ProgressAction> for Action {
    fn from(action: ProgressAction) -> Self {
        Action::Progress(action)
    }
}

/// What a dispatch did.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The action was a no-op in the current state.
    Skipped,
    Notified(NoticeId),
    /// The user fetch for this token was claimed by the caller.
    FetchClaimed(SessionToken),
    ToggleStarted(ToggleTicket),
    ToggleRefused(ToggleError),
    /// A failed toggle was rolled back; carries the restored status.
    Reverted(Option<ProgressStatus>),
}

#[derive(Debug, Clone)]
pub struct Store {
    state: Arc<Mutex<AppState>>,
    clock: Clock,
}

impl Store {
    #[must_use]
    pub fn new(notice_ttl: Duration, clock: Clock) -> Self {
        Self {
            state: Arc::new(Mutex::new(AppState::new(notice_ttl))),
            clock,
        }
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn dispatch(&self, action: impl Into<Action>) -> Outcome {
        let action = action.into();
        tracing::trace!(?action, "dispatch");
        let mut state = self.lock();
        match action {
            Action::Auth(action) => state.auth.reduce(action),
            Action::Topics(action) => state.topics.reduce(action),
            Action::Progress(action) => state.progress.reduce(action),
            Action::Notify { level, message, at } => {
                Outcome::Notified(state.notices.push(level, message, at))
            }
            Action::DismissNotice(id) => {
                if state.notices.dismiss(id) {
                    Outcome::Applied
                } else {
                    Outcome::Skipped
                }
            }
        }
    }

    /// Pushes a notice stamped with the store's clock.
    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) -> NoticeId {
        let message = message.into();
        tracing::trace!(level = level.as_str(), %message, "notify");
        let at = self.clock.now();
        self.lock().notices.push(level, message, at)
    }

    /// Prunes expired notices and hands the rest to the caller.
    pub fn take_notices(&self) -> Vec<track_core::model::Notice> {
        let now = self.clock.now();
        let mut state = self.lock();
        state.notices.prune(now);
        state.notices.drain()
    }

    #[must_use]
    pub fn snapshot(&self) -> AppState {
        self.lock().clone()
    }

    /// Runs `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.lock())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(
            Duration::seconds(NoticeBoard::DEFAULT_TTL_SECS),
            Clock::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use track_core::time::fixed_clock;

    #[test]
    fn notices_expire_with_the_store_clock() {
        let clock = fixed_clock();
        let store = Store::new(Duration::seconds(5), clock.clone());
        store.notify(NoticeLevel::Success, "Logged in successfully");
        clock.advance(Duration::seconds(3));
        store.notify(NoticeLevel::Error, "Failed to fetch topics");

        clock.advance(Duration::seconds(3));
        let notices = store.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Failed to fetch topics");
        assert!(store.read(|s| s.notices.is_empty()));
    }

    #[test]
    fn dismiss_unknown_notice_is_skipped() {
        let store = Store::default();
        let id = store.notify(NoticeLevel::Info, "hello");
        assert_eq!(store.dispatch(Action::DismissNotice(id)), Outcome::Applied);
        assert_eq!(store.dispatch(Action::DismissNotice(id)), Outcome::Skipped);
    }

    #[test]
    fn snapshot_is_detached() {
        let store = Store::default();
        let before = store.snapshot();
        store.dispatch(TopicAction::Rejected("boom".into()));
        assert!(before.topics.error.is_none());
        assert_eq!(store.snapshot().topics.error.as_deref(), Some("boom"));
    }
}
