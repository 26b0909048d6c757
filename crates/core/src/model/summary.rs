use serde::{Deserialize, Serialize};

use crate::model::progress::ProgressStatus;
use crate::model::topic::Difficulty;

/// Aggregate completion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    pub percentage: u32,
}

impl ProgressSummary {
    pub const EMPTY: Self = Self {
        total: 0,
        completed: 0,
        pending: 0,
        percentage: 0,
    };

    /// Derives a summary from counts. `completed` is clamped to `total`.
    #[must_use]
    pub fn from_counts(total: u32, completed: u32) -> Self {
        let completed = completed.min(total);
        Self {
            total,
            completed,
            pending: total - completed,
            percentage: completion_percentage(completed, total),
        }
    }

    #[must_use]
    pub fn from_statuses(statuses: impl IntoIterator<Item = ProgressStatus>) -> Self {
        let (total, completed) = statuses
            .into_iter()
            .fold((0_u32, 0_u32), |(total, done), status| {
                (total + 1, done + u32::from(status.is_done()))
            });
        Self::from_counts(total, completed)
    }
}

/// `round(completed / total * 100)`, and 0 when `total` is 0.
///
/// Halves round up, computed exactly in integers.
#[must_use]
pub fn completion_percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let completed = u64::from(completed);
    let total = u64::from(total);
    // floor(c*100/t + 1/2) == floor((200c + t) / 2t)
    let rounded = (200 * completed + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Completion split by subtopic difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyBreakdown {
    pub easy: ProgressSummary,
    pub medium: ProgressSummary,
    pub hard: ProgressSummary,
}

impl DifficultyBreakdown {
    #[must_use]
    pub fn from_statuses(rows: impl IntoIterator<Item = (Difficulty, ProgressStatus)>) -> Self {
        let mut counts = [(0_u32, 0_u32); 3];
        for (difficulty, status) in rows {
            let (total, done) = &mut counts[difficulty as usize];
            *total += 1;
            *done += u32::from(status.is_done());
        }
        let [easy, medium, hard] =
            counts.map(|(total, done)| ProgressSummary::from_counts(total, done));
        Self { easy, medium, hard }
    }

    #[must_use]
    pub fn get(&self, difficulty: Difficulty) -> ProgressSummary {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    /// Easy, medium, hard.
    pub fn iter(&self) -> impl Iterator<Item = (Difficulty, ProgressSummary)> + '_ {
        Difficulty::ALL.into_iter().map(|d| (d, self.get(d)))
    }
}

/// The summary currently shown, tagged with where it came from.
///
/// A server summary is authoritative until the next local mutation, at
/// which point the summary is recomputed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryView {
    Local(ProgressSummary),
    Server(ProgressSummary),
}

impl SummaryView {
    #[must_use]
    pub fn summary(&self) -> &ProgressSummary {
        match self {
            SummaryView::Local(s) | SummaryView::Server(s) => s,
        }
    }

    #[must_use]
    pub fn is_authoritative(&self) -> bool {
        matches!(self, SummaryView::Server(_))
    }

    #[must_use]
    pub fn source(&self) -> &'static str {
        match self {
            SummaryView::Local(_) => "local",
            SummaryView::Server(_) => "server",
        }
    }
}

impl Default for SummaryView {
    fn default() -> Self {
        SummaryView::Local(ProgressSummary::EMPTY)
    }
}
