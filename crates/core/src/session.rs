//! Session token and the derived authentication phase.

use std::fmt;

use thiserror::Error;

use crate::model::User;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session token cannot be empty")]
    EmptyToken,
}

/// Opaque bearer token issued by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// # Errors
    ///
    /// Returns `SessionError::EmptyToken` if the token is blank.
    pub fn new(token: impl Into<String>) -> Result<Self, SessionError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }
        Ok(Self(token))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never print the secret.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(***{})", self.0.len())
    }
}

/// Where the client stands with respect to authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No token.
    Anonymous,
    /// A token exists but the user has not been resolved yet.
    Resolving,
    /// Token and user present, but the email is not verified.
    Unverified,
    /// Token and verified user present.
    Authenticated,
}

impl SessionPhase {
    #[must_use]
    pub fn derive(token: Option<&SessionToken>, user: Option<&User>) -> Self {
        match (token, user) {
            (None, _) => SessionPhase::Anonymous,
            (Some(_), None) => SessionPhase::Resolving,
            (Some(_), Some(user)) if user.is_verified => SessionPhase::Authenticated,
            (Some(_), Some(_)) => SessionPhase::Unverified,
        }
    }

    #[must_use]
    pub fn is_authenticated(self) -> bool {
        matches!(self, SessionPhase::Authenticated)
    }
}
