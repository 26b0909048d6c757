use track_core::model::User;
use track_core::{SessionPhase, SessionToken};

use super::Outcome;

/// Authentication slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub token: Option<SessionToken>,
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
    /// Set once a user fetch has been started for the current token.
    pub fetch_attempted: bool,
}

impl AuthState {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        SessionPhase::derive(self.token.as_ref(), self.user.as_ref())
    }

    /// A token is held but nobody has tried to resolve its user yet.
    #[must_use]
    pub fn needs_user_fetch(&self) -> bool {
        self.token.is_some() && self.user.is_none() && !self.fetch_attempted
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    /// Token read back from the session store at startup.
    TokenRestored(Option<SessionToken>),
    Pending,
    SessionEstablished { user: User, token: SessionToken },
    /// Claims the one fetch allowed per token and answers with that token.
    /// `Skipped` when already claimed.
    UserFetchStarted,
    /// User resolved for `token`. `Skipped` if the session moved on since.
    UserLoaded { user: User, token: SessionToken },
    /// Resolving `token` failed. Clears the session only if `token` is
    /// still the current one; `Skipped` otherwise.
    UserFetchFailed { token: SessionToken, error: String },
    Rejected(String),
    /// A request finished without touching the session.
    Completed,
    SessionCleared { error: Option<String> },
    ClearError,
}

impl AuthState {
    fn holds(&self, token: &SessionToken) -> bool {
        self.token.as_ref() == Some(token)
    }

    pub(crate) fn reduce(&mut self, action: AuthAction) -> Outcome {
        match action {
            AuthAction::TokenRestored(token) => {
                self.token = token;
                self.user = None;
                self.fetch_attempted = false;
            }
            AuthAction::Pending => {
                self.loading = true;
                self.error = None;
            }
            AuthAction::SessionEstablished { user, token } => {
                self.token = Some(token);
                self.user = Some(user);
                self.loading = false;
                self.error = None;
                self.fetch_attempted = true;
            }
            AuthAction::UserFetchStarted => {
                let Some(token) = self.token.clone().filter(|_| self.needs_user_fetch()) else {
                    return Outcome::Skipped;
                };
                self.fetch_attempted = true;
                self.loading = true;
                self.error = None;
                return Outcome::FetchClaimed(token);
            }
            AuthAction::UserLoaded { user, token } => {
                if !self.holds(&token) {
                    return Outcome::Skipped;
                }
                self.user = Some(user);
                self.loading = false;
            }
            AuthAction::UserFetchFailed { token, error } => {
                if !self.holds(&token) {
                    return Outcome::Skipped;
                }
                self.token = None;
                self.user = None;
                self.loading = false;
                self.fetch_attempted = false;
                self.error = Some(error);
            }
            AuthAction::Rejected(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            AuthAction::Completed => {
                self.loading = false;
            }
            AuthAction::SessionCleared { error } => {
                self.token = None;
                self.user = None;
                self.loading = false;
                self.fetch_attempted = false;
                self.error = error;
            }
            AuthAction::ClearError => {
                self.error = None;
            }
        }
        Outcome::Applied
    }
}
