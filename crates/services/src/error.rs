//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by a `Backend`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("request failed with status {status}{}", message_suffix(.message))]
    Status {
        status: reqwest::StatusCode,
        message: Option<String>,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid response payload: {0}")]
    InvalidPayload(#[from] track_core::Error),
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
    #[error("invalid api url: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == reqwest::StatusCode::UNAUTHORIZED)
    }

    /// The `message` the server put in its error body, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Message to surface to the user: the server's, else `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_owned()
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Errors emitted by the auth, topic and progress services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// A request was rejected; `message` is what the user is shown.
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiError,
    },
    #[error("not signed in")]
    NotSignedIn,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub(crate) fn rejected(source: ApiError, fallback: &str) -> Self {
        Self::Rejected {
            message: source.user_message(fallback),
            source,
        }
    }

    /// Message suitable for a slice `error` field or a notice.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ServiceError::Rejected { source, .. } if source.is_unauthorized())
    }
}

/// Errors emitted while loading client configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid {var} value: {raw}")]
    InvalidValue { var: &'static str, raw: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_prefers_server_message() {
        let err = ApiError::Status {
            status: reqwest::StatusCode::BAD_REQUEST,
            message: Some("Invalid credentials".into()),
        };
        assert_eq!(err.user_message("Login failed"), "Invalid credentials");
        assert_eq!(
            err.to_string(),
            "request failed with status 400 Bad Request: Invalid credentials"
        );
    }

    #[test]
    fn status_error_without_message_uses_fallback() {
        let err = ApiError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            message: None,
        };
        assert_eq!(err.user_message("Failed to fetch topics"), "Failed to fetch topics");
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn unauthorized_is_detected_through_service_error() {
        let err = ServiceError::rejected(
            ApiError::Status {
                status: reqwest::StatusCode::UNAUTHORIZED,
                message: None,
            },
            "Failed to fetch progress",
        );
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Failed to fetch progress");
    }
}
