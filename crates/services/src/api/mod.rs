//! Remote REST API seam.
//!
//! `Backend` speaks in domain types; `HttpBackend` is the production
//! implementation and tests substitute their own.

use std::fmt;

use async_trait::async_trait;
use track_core::SessionToken;
use track_core::model::{GoogleProfile, ProgressEntry, ProgressSummary, Topic, TopicId, User};

use crate::error::ApiError;

mod http;
mod wire;

pub use http::HttpBackend;

/// A signed-in session as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: User,
    pub token: SessionToken,
}

/// Auth endpoints answer either with a session or with a plain message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthReply {
    Session(AuthSession),
    Message(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError>;

    /// `POST /auth/register`
    async fn register(&self, registration: &Registration) -> Result<AuthReply, ApiError>;

    /// `POST /auth/google-login`
    async fn google_login(&self, profile: &GoogleProfile) -> Result<AuthSession, ApiError>;

    /// `POST /auth/forgot-password`
    async fn forgot_password(&self, email: &str) -> Result<String, ApiError>;

    /// `POST /auth/reset-password`
    async fn reset_password(&self, reset_token: &str, password: &str) -> Result<String, ApiError>;

    /// `POST /auth/verify-email`
    async fn verify_email(&self, verification_token: &str) -> Result<AuthReply, ApiError>;

    /// `GET /auth/me`
    async fn current_user(&self, token: &SessionToken) -> Result<User, ApiError>;

    /// `GET /topics`
    async fn topics(&self) -> Result<Vec<Topic>, ApiError>;

    /// `GET /topics/{id}`
    async fn topic(&self, id: &TopicId) -> Result<Topic, ApiError>;

    /// `GET /progress/`
    async fn progress(&self, token: &SessionToken) -> Result<Vec<ProgressEntry>, ApiError>;

    /// `GET /progress/summary`. `None` when the server sent no summary.
    async fn progress_summary(
        &self,
        token: &SessionToken,
    ) -> Result<Option<ProgressSummary>, ApiError>;

    /// `PUT /progress/update`. Returns the updated collection when the
    /// server includes one.
    async fn update_progress(
        &self,
        token: &SessionToken,
        entry: &ProgressEntry,
    ) -> Result<Option<Vec<ProgressEntry>>, ApiError>;
}
