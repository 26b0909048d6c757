use thiserror::Error;

use crate::model::{ParseIdError, ProgressError, TopicError};
use crate::session::SessionError;

/// Any domain validation failure, for callers that convert wire data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
