use track_core::model::{
    ProgressBook, ProgressEntry, ProgressKey, ProgressStatus, ProgressSummary, SummaryView,
};
use track_core::{ToggleTicket, ToggleTracker};

use super::Outcome;

/// Progress slice: the locally known entries, their sync states and the
/// summary on display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub book: ProgressBook,
    pub tracker: ToggleTracker,
    pub summary: SummaryView,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ProgressAction {
    Pending,
    Loaded(Vec<ProgressEntry>),
    /// `None` when the server sent no summary; the local one is kept.
    SummaryLoaded(Option<ProgressSummary>),
    Rejected(String),
    /// Sets a status without going through the server.
    LocalSet {
        key: ProgressKey,
        status: ProgressStatus,
    },
    ToggleRequested(ProgressKey),
    ToggleSettled {
        ticket: ToggleTicket,
        progress: Option<Vec<ProgressEntry>>,
    },
    ToggleFailed {
        ticket: ToggleTicket,
        message: String,
    },
    ClearError,
    Cleared,
}

impl ProgressState {
    fn recompute(&mut self) {
        self.summary = SummaryView::Local(self.book.summary());
    }

    /// Replaces the book with a server collection, keeping optimistic
    /// statuses of writes still in flight.
    fn replace_book(&mut self, entries: Vec<ProgressEntry>) {
        self.book = ProgressBook::from_entries(entries);
        self.tracker.overlay(&mut self.book);
    }

    pub(crate) fn reduce(&mut self, action: ProgressAction) -> Outcome {
        match action {
            ProgressAction::Pending => {
                self.loading = true;
                self.error = None;
            }
            ProgressAction::Loaded(entries) => {
                self.replace_book(entries);
                self.loading = false;
                self.recompute();
            }
            ProgressAction::SummaryLoaded(summary) => {
                self.loading = false;
                match summary {
                    Some(summary) => self.summary = SummaryView::Server(summary),
                    None => self.recompute(),
                }
            }
            ProgressAction::Rejected(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            ProgressAction::LocalSet { key, status } => {
                self.book.set(key, status);
                self.recompute();
            }
            ProgressAction::ToggleRequested(key) => {
                return match self.tracker.begin(&mut self.book, key) {
                    Ok(ticket) => {
                        self.recompute();
                        Outcome::ToggleStarted(ticket)
                    }
                    Err(err) => Outcome::ToggleRefused(err),
                };
            }
            ProgressAction::ToggleSettled { ticket, progress } => {
                if let Err(err) = self.tracker.settle(ticket) {
                    return Outcome::ToggleRefused(err);
                }
                if let Some(entries) = progress {
                    self.replace_book(entries);
                }
                self.recompute();
            }
            ProgressAction::ToggleFailed { ticket, message } => {
                return match self.tracker.revert(&mut self.book, ticket) {
                    Ok(restored) => {
                        self.error = Some(message);
                        self.recompute();
                        Outcome::Reverted(restored)
                    }
                    Err(err) => Outcome::ToggleRefused(err),
                };
            }
            ProgressAction::ClearError => self.error = None,
            ProgressAction::Cleared => *self = Self::default(),
        }
        Outcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use track_core::model::{SubtopicId, TopicId};
    use track_core::{EntrySync, ToggleError};

    fn key(t: &str, s: &str) -> ProgressKey {
        ProgressKey::new(TopicId::new(t).unwrap(), SubtopicId::new(s).unwrap())
    }

    fn entry(t: &str, s: &str, status: ProgressStatus) -> ProgressEntry {
        ProgressEntry::new(key(t, s), status)
    }

    fn start(state: &mut ProgressState, k: ProgressKey) -> ToggleTicket {
        match state.reduce(ProgressAction::ToggleRequested(k)) {
            Outcome::ToggleStarted(ticket) => ticket,
            other => panic!("expected toggle to start, got {other:?}"),
        }
    }

    #[test]
    fn toggle_updates_summary_before_settling() {
        let mut state = ProgressState::default();
        state.reduce(ProgressAction::Loaded(vec![entry("t", "a", ProgressStatus::Pending)]));

        let ticket = start(&mut state, key("t", "a"));
        assert_eq!(state.book.status(&key("t", "a")), Some(ProgressStatus::Done));
        assert_eq!(state.summary, SummaryView::Local(ProgressSummary::from_counts(1, 1)));

        assert_eq!(
            state.reduce(ProgressAction::ToggleSettled { ticket, progress: None }),
            Outcome::Applied
        );
        assert_eq!(state.tracker.state(&key("t", "a")), EntrySync::Synced);
    }

    #[test]
    fn second_toggle_on_same_key_is_refused() {
        let mut state = ProgressState::default();
        let _ticket = start(&mut state, key("t", "a"));
        assert_eq!(
            state.reduce(ProgressAction::ToggleRequested(key("t", "a"))),
            Outcome::ToggleRefused(ToggleError::InFlight(key("t", "a")))
        );
        assert_eq!(state.book.status(&key("t", "a")), Some(ProgressStatus::Done));

        let _other = start(&mut state, key("t", "b"));
        assert_eq!(state.tracker.in_flight_count(), 2);
    }

    #[test]
    fn failed_toggle_restores_summary_exactly() {
        let mut state = ProgressState::default();
        state.reduce(ProgressAction::Loaded(vec![
            entry("t", "a", ProgressStatus::Done),
            entry("t", "b", ProgressStatus::Pending),
        ]));
        let before = state.summary;

        let ticket = start(&mut state, key("t", "new"));
        assert_eq!(state.book.len(), 3);
        let outcome = state.reduce(ProgressAction::ToggleFailed {
            ticket,
            message: "Failed to update progress".into(),
        });

        assert_eq!(outcome, Outcome::Reverted(None));
        assert_eq!(state.book.len(), 2);
        assert_eq!(state.summary, before);
        assert_eq!(state.error.as_deref(), Some("Failed to update progress"));
        assert!(!state.tracker.is_in_flight(&key("t", "new")));
    }

    #[test]
    fn failed_toggle_restores_prior_status() {
        let mut state = ProgressState::default();
        state.reduce(ProgressAction::Loaded(vec![entry("t", "a", ProgressStatus::Done)]));
        let ticket = start(&mut state, key("t", "a"));
        assert_eq!(state.book.status(&key("t", "a")), Some(ProgressStatus::Pending));

        let outcome = state.reduce(ProgressAction::ToggleFailed {
            ticket,
            message: "nope".into(),
        });
        assert_eq!(outcome, Outcome::Reverted(Some(ProgressStatus::Done)));
        assert_eq!(state.book.status(&key("t", "a")), Some(ProgressStatus::Done));
    }

    #[test]
    fn settled_collection_keeps_other_pending_writes() {
        let mut state = ProgressState::default();
        let first = start(&mut state, key("t", "a"));
        let _second = start(&mut state, key("t", "b"));

        // Server answers the first write before it has seen the second.
        state.reduce(ProgressAction::ToggleSettled {
            ticket: first,
            progress: Some(vec![entry("t", "a", ProgressStatus::Done)]),
        });

        assert_eq!(state.book.status(&key("t", "a")), Some(ProgressStatus::Done));
        assert_eq!(state.book.status(&key("t", "b")), Some(ProgressStatus::Done));
        assert_eq!(state.summary.summary().completed, 2);
    }

    #[test]
    fn server_summary_is_authoritative_until_next_mutation() {
        let mut state = ProgressState::default();
        let server = ProgressSummary {
            total: 40,
            completed: 10,
            pending: 30,
            percentage: 25,
        };
        state.reduce(ProgressAction::SummaryLoaded(Some(server)));
        assert!(state.summary.is_authoritative());
        assert_eq!(*state.summary.summary(), server);

        state.reduce(ProgressAction::LocalSet {
            key: key("t", "a"),
            status: ProgressStatus::Done,
        });
        assert!(!state.summary.is_authoritative());
        assert_eq!(*state.summary.summary(), ProgressSummary::from_counts(1, 1));
    }

    #[test]
    fn toggle_twice_returns_to_same_summary() {
        let mut state = ProgressState::default();
        state.reduce(ProgressAction::Loaded(vec![
            entry("t", "a", ProgressStatus::Pending),
            entry("t", "b", ProgressStatus::Done),
        ]));
        let before = state.summary;

        let ticket = start(&mut state, key("t", "a"));
        state.reduce(ProgressAction::ToggleSettled { ticket, progress: None });
        let ticket = start(&mut state, key("t", "a"));
        state.reduce(ProgressAction::ToggleSettled { ticket, progress: None });

        assert_eq!(state.summary, before);
    }

    #[test]
    fn cleared_resets_slice() {
        let mut state = ProgressState::default();
        let _ticket = start(&mut state, key("t", "a"));
        state.reduce(ProgressAction::Cleared);
        assert_eq!(state, ProgressState::default());
    }
}
