use std::sync::Arc;

use track_core::SessionPhase;
use track_core::model::{GoogleProfile, NoticeLevel, User};

use crate::api::{AuthReply, AuthSession, Backend, Credentials, Registration};
use crate::error::{ApiError, ServiceError};
use crate::session::SessionKeeper;
use crate::store::{AuthAction, Outcome, Store};

const VERIFY_FIRST: &str =
    "Please verify your email before logging in. Check your inbox for verification link.";

/// Result of an auth request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    SignedIn(User),
    /// Credentials were accepted but the email is not verified yet; no
    /// session was kept.
    Unverified,
    /// The server answered with a message only.
    Message(String),
}

/// Sign-in, sign-up and session reconciliation.
#[derive(Clone)]
pub struct AuthService {
    store: Store,
    backend: Arc<dyn Backend>,
    session: SessionKeeper,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Store, backend: Arc<dyn Backend>, session: SessionKeeper) -> Self {
        Self {
            store,
            backend,
            session,
        }
    }

    /// Mirrors the persisted token into the auth slice.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the session store cannot be read.
    pub async fn restore(&self) -> Result<SessionPhase, ServiceError> {
        let token = self.session.stored_token().await?;
        tracing::debug!(restored = token.is_some(), "restoring session");
        self.store.dispatch(AuthAction::TokenRestored(token));
        Ok(self.phase())
    }

    /// Resolves the user behind a token that has none yet. Safe to call
    /// repeatedly and concurrently: the fetch happens once per token.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure; the session has been cleared by then.
    pub async fn reconcile(&self) -> Result<SessionPhase, ServiceError> {
        self.fetch_current_user().await?;
        Ok(self.phase())
    }

    /// `GET /auth/me` for the token in the auth slice.
    ///
    /// Returns `Ok(None)` without a request when there is nothing to resolve
    /// or another caller already claimed the fetch, and also when the session
    /// was replaced while the request ran. Any other failure clears the token.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Rejected` when the server refuses the token.
    pub async fn fetch_current_user(&self) -> Result<Option<User>, ServiceError> {
        let Outcome::FetchClaimed(token) = self.store.dispatch(AuthAction::UserFetchStarted) else {
            return Ok(None);
        };

        match self.backend.current_user(&token).await {
            Ok(user) => {
                let loaded = self.store.dispatch(AuthAction::UserLoaded {
                    user: user.clone(),
                    token,
                });
                if loaded == Outcome::Skipped {
                    tracing::debug!("session replaced while resolving user; result dropped");
                    return Ok(None);
                }
                tracing::info!(user = %user.id, verified = user.is_verified, "session resolved");
                Ok(Some(user))
            }
            Err(source) => {
                let err = ServiceError::rejected(source, "Failed to fetch user");
                let message = if err.is_unauthorized() {
                    crate::session::SESSION_EXPIRED.to_owned()
                } else {
                    err.user_message()
                };
                match self.session.end_if_current(&token, message.clone()).await {
                    Ok(false) => {
                        tracing::debug!(
                            error = %err,
                            "session replaced while resolving user; failure dropped"
                        );
                        return Ok(None);
                    }
                    Ok(true) => {}
                    Err(clear_err) => {
                        tracing::warn!(error = %clear_err, "failed to clear persisted session");
                    }
                }
                tracing::warn!(error = %err, "could not resolve session; token cleared");
                self.store.notify(NoticeLevel::Error, message);
                Err(err)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Rejected` with the server's message, or
    /// `ServiceError::Storage` if the token cannot be persisted.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthOutcome, ServiceError> {
        self.store.dispatch(AuthAction::Pending);
        match self.backend.login(credentials).await {
            Ok(session) => self.accept_verified(session, "Login successful!").await,
            Err(source) => Err(self.fail(source, "Login failed")),
        }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Rejected` with the server's message, or
    /// `ServiceError::Storage` if the token cannot be persisted.
    pub async fn google_login(&self, profile: &GoogleProfile) -> Result<AuthOutcome, ServiceError> {
        self.store.dispatch(AuthAction::Pending);
        match self.backend.google_login(profile).await {
            Ok(session) => self.accept_verified(session, "Google login successful!").await,
            Err(source) => Err(self.fail(source, "Google login failed")),
        }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Rejected` with the server's message, or
    /// `ServiceError::Storage` if a returned token cannot be persisted.
    pub async fn signup(&self, registration: &Registration) -> Result<AuthOutcome, ServiceError> {
        self.store.dispatch(AuthAction::Pending);
        match self.backend.register(registration).await {
            Ok(AuthReply::Session(session)) if session.user.is_verified => {
                self.establish(session, "Registration successful!").await
            }
            Ok(_) => Ok(self.message_only(
                "Registration successful! Please check your email to verify your account.",
            )),
            Err(source) => Err(self.fail(source, "Registration failed")),
        }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Rejected` with the server's message.
    pub async fn forgot_password(&self, email: &str) -> Result<AuthOutcome, ServiceError> {
        self.store.dispatch(AuthAction::Pending);
        match self.backend.forgot_password(email).await {
            Ok(_) => Ok(self.message_only("Password reset email sent! Please check your inbox.")),
            Err(source) => Err(self.fail(source, "Failed to send reset email")),
        }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Rejected` with the server's message.
    pub async fn reset_password(
        &self,
        reset_token: &str,
        password: &str,
    ) -> Result<AuthOutcome, ServiceError> {
        self.store.dispatch(AuthAction::Pending);
        match self.backend.reset_password(reset_token, password).await {
            Ok(message) => Ok(self.message_only(non_empty_or(
                message,
                "Password reset successful. You can now log in.",
            ))),
            Err(source) => Err(self.fail(source, "Failed to reset password")),
        }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Rejected` with the server's message, or
    /// `ServiceError::Storage` if a returned token cannot be persisted.
    pub async fn verify_email(&self, verification_token: &str) -> Result<AuthOutcome, ServiceError> {
        self.store.dispatch(AuthAction::Pending);
        match self.backend.verify_email(verification_token).await {
            Ok(AuthReply::Session(session)) if session.user.is_verified => {
                self.establish(session, "Email verified successfully!").await
            }
            Ok(AuthReply::Message(message)) => Ok(self.message_only(non_empty_or(
                message,
                "Email verified successfully! You can now log in.",
            ))),
            Ok(AuthReply::Session(_)) => {
                Ok(self.message_only("Email verified successfully! You can now log in."))
            }
            Err(source) => Err(self.fail(source, "Email verification failed")),
        }
    }

    /// Forgets the session locally and in the session store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the token cannot be removed; the
    /// in-memory session is cleared regardless.
    pub async fn logout(&self) -> Result<(), ServiceError> {
        self.session.end(None).await?;
        tracing::info!("signed out");
        self.store.notify(NoticeLevel::Info, "Logged out");
        Ok(())
    }

    pub fn clear_error(&self) {
        self.store.dispatch(AuthAction::ClearError);
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.store.read(|s| s.auth.phase())
    }

    async fn accept_verified(
        &self,
        session: AuthSession,
        success: &str,
    ) -> Result<AuthOutcome, ServiceError> {
        if !session.user.is_verified {
            tracing::info!(user = %session.user.id, "sign-in refused for unverified email");
            self.store.dispatch(AuthAction::Completed);
            self.store.notify(NoticeLevel::Warning, VERIFY_FIRST);
            return Ok(AuthOutcome::Unverified);
        }
        self.establish(session, success).await
    }

    async fn establish(
        &self,
        session: AuthSession,
        success: &str,
    ) -> Result<AuthOutcome, ServiceError> {
        if let Err(err) = self.session.persist(&session.token).await {
            self.store.dispatch(AuthAction::Rejected(err.user_message()));
            self.store.notify(NoticeLevel::Error, err.user_message());
            return Err(err);
        }
        tracing::info!(user = %session.user.id, "signed in");
        let user = session.user.clone();
        self.store.dispatch(AuthAction::SessionEstablished {
            user: session.user,
            token: session.token,
        });
        self.store.notify(NoticeLevel::Success, success);
        Ok(AuthOutcome::SignedIn(user))
    }

    fn message_only(&self, message: impl Into<String>) -> AuthOutcome {
        let message = message.into();
        self.store.dispatch(AuthAction::Completed);
        self.store.notify(NoticeLevel::Success, message.clone());
        AuthOutcome::Message(message)
    }

    fn fail(&self, source: ApiError, fallback: &str) -> ServiceError {
        let err = ServiceError::rejected(source, fallback);
        tracing::warn!(error = %err, "auth request rejected");
        self.store.dispatch(AuthAction::Rejected(err.user_message()));
        self.store.notify(NoticeLevel::Error, err.user_message());
        err
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_owned()
    } else {
        message
    }
}
