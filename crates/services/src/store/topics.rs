use track_core::model::{Topic, TopicCatalog};

use super::Outcome;

/// Topic catalog slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicState {
    pub catalog: TopicCatalog,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicAction {
    Pending,
    Loaded(Vec<Topic>),
    TopicLoaded(Topic),
    Rejected(String),
    ClearError,
}

impl TopicState {
    pub(crate) fn reduce(&mut self, action: TopicAction) -> Outcome {
        match action {
            TopicAction::Pending => {
                self.loading = true;
                self.error = None;
            }
            TopicAction::Loaded(topics) => {
                self.catalog = TopicCatalog::from_topics(topics);
                self.loading = false;
            }
            TopicAction::TopicLoaded(topic) => {
                self.catalog.upsert(topic);
                self.loading = false;
            }
            TopicAction::Rejected(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            TopicAction::ClearError => self.error = None,
        }
        Outcome::Applied
    }
}
