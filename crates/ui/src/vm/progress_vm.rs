use serde::Serialize;
use services::AppState;

use crate::vm::dashboard_vm::{DifficultyVm, SummaryVm, difficulty_rows};

/// Completion of one topic over the entries the user has touched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TopicProgressVm {
    pub id: String,
    pub name: String,
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
    /// Over every subtopic of the topic, untouched ones counted as pending.
    pub by_difficulty: Vec<DifficultyVm>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProgressVm {
    pub overall: SummaryVm,
    pub topics: Vec<TopicProgressVm>,
    pub error: Option<String>,
}

#[must_use]
pub fn map_progress(state: &AppState) -> ProgressVm {
    let book = &state.progress.book;
    let topics = state
        .topics
        .catalog
        .iter()
        .map(|topic| {
            let summary = book.topic_summary(&topic.id);
            TopicProgressVm {
                id: topic.id.to_string(),
                name: topic.name.clone(),
                completed: summary.completed,
                total: summary.total,
                percentage: summary.percentage,
                by_difficulty: difficulty_rows(&topic.difficulty_breakdown(book)),
            }
        })
        .collect();

    ProgressVm {
        overall: SummaryVm::from(&state.progress.summary),
        topics,
        error: state.progress.error.clone(),
    }
}
