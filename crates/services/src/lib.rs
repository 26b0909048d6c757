#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod auth_service;
pub mod config;
pub mod error;
pub mod progress_service;
pub mod session;
pub mod store;
pub mod topic_service;

pub use track_core::Clock;

pub use api::{AuthReply, AuthSession, Backend, Credentials, HttpBackend, Registration};
pub use app_services::{AppServices, PageLoad};
pub use auth_service::{AuthOutcome, AuthService};
pub use config::ClientConfig;
pub use error::{ApiError, AppServicesError, ConfigError, ServiceError};
pub use progress_service::{ProgressService, ToggleOutcome};
pub use session::SessionKeeper;
pub use store::{Action, AppState, Outcome, Store};
pub use topic_service::TopicService;
