use serde::Serialize;
use services::AppState;
use track_core::model::{DifficultyBreakdown, SummaryView};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryVm {
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    pub percentage: u32,
    /// `server` when the numbers came from the backend, `local` otherwise.
    pub source: &'static str,
}

impl From<&SummaryView> for SummaryVm {
    fn from(view: &SummaryView) -> Self {
        let summary = view.summary();
        Self {
            total: summary.total,
            completed: summary.completed,
            pending: summary.pending,
            percentage: summary.percentage,
            source: view.source(),
        }
    }
}

/// One difficulty level's completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DifficultyVm {
    pub level: &'static str,
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

/// Easy, medium and hard rows, always all three.
#[must_use]
pub fn difficulty_rows(breakdown: &DifficultyBreakdown) -> Vec<DifficultyVm> {
    breakdown
        .iter()
        .map(|(difficulty, summary)| DifficultyVm {
            level: difficulty.as_str(),
            completed: summary.completed,
            total: summary.total,
            percentage: summary.percentage,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DashboardVm {
    pub greeting: String,
    pub summary: SummaryVm,
    pub by_difficulty: Vec<DifficultyVm>,
    pub topic_count: usize,
    pub subtopic_count: usize,
}

#[must_use]
pub fn map_dashboard(state: &AppState) -> DashboardVm {
    let greeting = match &state.auth.user {
        Some(user) => format!("Welcome back, {}!", user.display_name()),
        None => "Welcome back!".to_owned(),
    };
    DashboardVm {
        greeting,
        summary: SummaryVm::from(&state.progress.summary),
        by_difficulty: difficulty_rows(
            &state.topics.catalog.difficulty_breakdown(&state.progress.book),
        ),
        topic_count: state.topics.catalog.len(),
        subtopic_count: state.topics.catalog.subtopic_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use track_core::model::{
        Difficulty, ProgressBook, ProgressEntry, ProgressKey, ProgressStatus, ProgressSummary,
        Subtopic, SubtopicId, Topic, TopicCatalog, TopicId, User, UserId,
    };

    fn subtopic(id: &str, difficulty: Difficulty) -> Subtopic {
        Subtopic {
            id: SubtopicId::new(id).unwrap(),
            name: id.to_owned(),
            difficulty,
            resources: Vec::new(),
        }
    }

    #[test]
    fn greets_by_display_name_and_tags_source() {
        let mut state = AppState::default();
        state.auth.user = Some(User {
            id: UserId::new("u1").unwrap(),
            name: String::new(),
            email: "ada@example.com".into(),
            is_verified: true,
            avatar: None,
        });
        state.progress.summary = SummaryView::Server(ProgressSummary::from_counts(4, 1));

        let vm = map_dashboard(&state);

        assert_eq!(vm.greeting, "Welcome back, ada!");
        assert_eq!(vm.summary.percentage, 25);
        assert_eq!(vm.summary.source, "server");
        assert_eq!(vm.topic_count, 0);
        let levels: Vec<_> = vm.by_difficulty.iter().map(|row| row.level).collect();
        assert_eq!(levels, ["easy", "medium", "hard"]);
    }

    #[test]
    fn difficulty_rows_cover_the_catalog() {
        let mut state = AppState::default();
        state.topics.catalog = TopicCatalog::from_topics(vec![Topic {
            id: TopicId::new("arrays").unwrap(),
            name: "Arrays".into(),
            description: String::new(),
            order: 1,
            subtopics: vec![
                subtopic("s1", Difficulty::Easy),
                subtopic("s2", Difficulty::Easy),
                subtopic("s3", Difficulty::Medium),
            ],
        }]);
        state.progress.book = ProgressBook::from_entries([ProgressEntry::new(
            ProgressKey::new(TopicId::new("arrays").unwrap(), SubtopicId::new("s1").unwrap()),
            ProgressStatus::Done,
        )]);

        let vm = map_dashboard(&state);

        assert_eq!(
            vm.by_difficulty[0],
            DifficultyVm {
                level: "easy",
                completed: 1,
                total: 2,
                percentage: 50
            }
        );
        assert_eq!((vm.by_difficulty[1].completed, vm.by_difficulty[1].total), (0, 1));
        assert_eq!(vm.by_difficulty[2].percentage, 0);
    }
}
