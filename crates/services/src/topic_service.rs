use std::sync::Arc;

use track_core::model::{NoticeLevel, Topic, TopicId};

use crate::api::Backend;
use crate::error::{ApiError, ServiceError};
use crate::store::{Store, TopicAction};

/// Loads the topic catalog into the store.
#[derive(Clone)]
pub struct TopicService {
    store: Store,
    backend: Arc<dyn Backend>,
}

impl TopicService {
    #[must_use]
    pub fn new(store: Store, backend: Arc<dyn Backend>) -> Self {
        Self { store, backend }
    }

    /// Replaces the catalog with `GET /topics`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Rejected` if the request fails; the previous
    /// catalog is kept.
    pub async fn fetch_topics(&self) -> Result<usize, ServiceError> {
        self.store.dispatch(TopicAction::Pending);
        match self.backend.topics().await {
            Ok(topics) => {
                let count = topics.len();
                tracing::debug!(count, "topics loaded");
                self.store.dispatch(TopicAction::Loaded(topics));
                Ok(count)
            }
            Err(source) => Err(self.fail(source, "Failed to fetch topics")),
        }
    }

    /// Refreshes a single topic with `GET /topics/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Rejected` if the request fails.
    pub async fn fetch_topic(&self, id: &TopicId) -> Result<Topic, ServiceError> {
        self.store.dispatch(TopicAction::Pending);
        match self.backend.topic(id).await {
            Ok(topic) => {
                self.store.dispatch(TopicAction::TopicLoaded(topic.clone()));
                Ok(topic)
            }
            Err(source) => Err(self.fail(source, "Failed to fetch topic")),
        }
    }

    pub fn clear_error(&self) {
        self.store.dispatch(TopicAction::ClearError);
    }

    fn fail(&self, source: ApiError, fallback: &str) -> ServiceError {
        let err = ServiceError::rejected(source, fallback);
        tracing::warn!(error = %err, "topic request rejected");
        self.store.dispatch(TopicAction::Rejected(err.user_message()));
        self.store.notify(NoticeLevel::Error, err.user_message());
        err
    }
}
