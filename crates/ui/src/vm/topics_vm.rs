use serde::Serialize;
use services::AppState;
use track_core::ToggleTracker;
use track_core::model::{ProgressBook, ProgressKey, Subtopic, Topic};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LinkVm {
    pub label: &'static str,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubtopicVm {
    pub topic_id: String,
    pub subtopic_id: String,
    pub name: String,
    pub difficulty: &'static str,
    pub status: &'static str,
    pub done: bool,
    /// A write for this subtopic has not settled yet.
    pub in_flight: bool,
    pub links: Vec<LinkVm>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TopicVm {
    pub id: String,
    pub name: String,
    pub description: String,
    pub completed: usize,
    pub total: usize,
    pub subtopics: Vec<SubtopicVm>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TopicsVm {
    pub topics: Vec<TopicVm>,
    pub loading: bool,
    pub error: Option<String>,
}

fn map_subtopic(
    topic: &Topic,
    subtopic: &Subtopic,
    book: &ProgressBook,
    tracker: &ToggleTracker,
) -> SubtopicVm {
    let key = ProgressKey::new(topic.id.clone(), subtopic.id.clone());
    let status = book.displayed_status(&key);
    SubtopicVm {
        topic_id: topic.id.to_string(),
        subtopic_id: subtopic.id.to_string(),
        name: subtopic.name.clone(),
        difficulty: subtopic.difficulty.label(),
        status: status.as_str(),
        done: status.is_done(),
        in_flight: tracker.is_in_flight(&key),
        links: subtopic
            .resources
            .iter()
            .map(|link| LinkVm {
                label: link.kind.label(),
                url: link.url.to_string(),
            })
            .collect(),
    }
}

#[must_use]
pub fn map_topics(state: &AppState) -> TopicsVm {
    let progress = &state.progress;
    let topics = state
        .topics
        .catalog
        .iter()
        .map(|topic| {
            let subtopics: Vec<SubtopicVm> = topic
                .subtopics
                .iter()
                .map(|s| map_subtopic(topic, s, &progress.book, &progress.tracker))
                .collect();
            TopicVm {
                id: topic.id.to_string(),
                name: topic.name.clone(),
                description: topic.description.clone(),
                completed: subtopics.iter().filter(|s| s.done).count(),
                total: subtopics.len(),
                subtopics,
            }
        })
        .collect();

    TopicsVm {
        topics,
        loading: state.topics.loading || progress.loading,
        error: state.topics.error.clone().or_else(|| progress.error.clone()),
    }
}
