//! Optimistic toggle bookkeeping.
//!
//! Every progress key is in one of three states:
//!
//! ```text
//! Synced ──begin──▶ PendingWrite ──settle──▶ Synced
//!                        │
//!                        └──fail──▶ Reverting ──complete_revert──▶ Synced
//! ```
//!
//! A key that is not `Synced` cannot be toggled again; that is the
//! in-flight guard.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::{ProgressBook, ProgressKey, ProgressStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ToggleError {
    #[error("an update for {0} is already in flight")]
    InFlight(ProgressKey),
    #[error("no update in flight for {0}")]
    NotInFlight(ProgressKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySync {
    Synced,
    PendingWrite {
        /// Status before the toggle; `None` when the entry did not exist.
        prior: Option<ProgressStatus>,
        target: ProgressStatus,
    },
    Reverting {
        prior: Option<ProgressStatus>,
    },
}

/// Proof that a toggle was applied optimistically. Consumed exactly once by
/// `settle` or `fail`.
#[derive(Debug, PartialEq, Eq)]
pub struct ToggleTicket {
    key: ProgressKey,
    prior: Option<ProgressStatus>,
    target: ProgressStatus,
}

impl ToggleTicket {
    #[must_use]
    pub fn key(&self) -> &ProgressKey {
        &self.key
    }

    #[must_use]
    pub fn prior(&self) -> Option<ProgressStatus> {
        self.prior
    }

    /// Status the optimistic update wrote and the server will be asked for.
    #[must_use]
    pub fn target(&self) -> ProgressStatus {
        self.target
    }
}

/// Per-key sync states for keys that are not `Synced`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleTracker {
    states: HashMap<ProgressKey, EntrySync>,
}

impl ToggleTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self, key: &ProgressKey) -> EntrySync {
        self.states.get(key).copied().unwrap_or(EntrySync::Synced)
    }

    #[must_use]
    pub fn is_in_flight(&self, key: &ProgressKey) -> bool {
        self.states.contains_key(key)
    }

    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.states.len()
    }

    /// Flips the displayed status of `key` in `book` and locks the key.
    ///
    /// # Errors
    ///
    /// Returns `ToggleError::InFlight` if the key already has an update
    /// outstanding; the book is left untouched.
    pub fn begin(
        &mut self,
        book: &mut ProgressBook,
        key: ProgressKey,
    ) -> Result<ToggleTicket, ToggleError> {
        if self.is_in_flight(&key) {
            return Err(ToggleError::InFlight(key));
        }
        let prior = book.status(&key);
        let target = prior.unwrap_or_default().toggled();
        book.set(key.clone(), target);
        self.states
            .insert(key.clone(), EntrySync::PendingWrite { prior, target });
        Ok(ToggleTicket { key, prior, target })
    }

    /// The server accepted the write.
    ///
    /// # Errors
    ///
    /// Returns `ToggleError::NotInFlight` if the key is not pending.
    pub fn settle(&mut self, ticket: ToggleTicket) -> Result<(), ToggleError> {
        match self.states.get(&ticket.key) {
            Some(EntrySync::PendingWrite { .. }) => {
                self.states.remove(&ticket.key);
                Ok(())
            }
            _ => Err(ToggleError::NotInFlight(ticket.key)),
        }
    }

    /// The server rejected the write; the key moves to `Reverting`.
    ///
    /// # Errors
    ///
    /// Returns `ToggleError::NotInFlight` if the key is not pending.
    pub fn fail(&mut self, ticket: ToggleTicket) -> Result<ProgressKey, ToggleError> {
        match self.states.get_mut(&ticket.key) {
            Some(state) if matches!(state, EntrySync::PendingWrite { .. }) => {
                *state = EntrySync::Reverting {
                    prior: ticket.prior,
                };
                Ok(ticket.key)
            }
            _ => Err(ToggleError::NotInFlight(ticket.key)),
        }
    }

    /// Restores the pre-toggle status in `book` and unlocks the key.
    /// A lazily created entry is removed again.
    ///
    /// # Errors
    ///
    /// Returns `ToggleError::NotInFlight` if the key is not reverting.
    pub fn complete_revert(
        &mut self,
        book: &mut ProgressBook,
        key: &ProgressKey,
    ) -> Result<Option<ProgressStatus>, ToggleError> {
        let Some(EntrySync::Reverting { prior }) = self.states.get(key).copied() else {
            return Err(ToggleError::NotInFlight(key.clone()));
        };
        match prior {
            Some(status) => {
                book.set(key.clone(), status);
            }
            None => {
                book.remove(key);
            }
        }
        self.states.remove(key);
        Ok(prior)
    }

    /// `fail` followed by `complete_revert`.
    ///
    /// # Errors
    ///
    /// Returns `ToggleError::NotInFlight` if the key is not pending.
    pub fn revert(
        &mut self,
        book: &mut ProgressBook,
        ticket: ToggleTicket,
    ) -> Result<Option<ProgressStatus>, ToggleError> {
        let key = self.fail(ticket)?;
        self.complete_revert(book, &key)
    }

    /// Re-applies the optimistic status of every pending write on top of a
    /// collection that just arrived from the server.
    pub fn overlay(&self, book: &mut ProgressBook) {
        for (key, state) in &self.states {
            if let EntrySync::PendingWrite { target, .. } = state {
                book.set(key.clone(), *target);
            }
        }
    }

    /// Drops all locks, e.g. on logout.
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SubtopicId, TopicId};

    fn key(s: &str) -> ProgressKey {
        ProgressKey::new(TopicId::new("t").unwrap(), SubtopicId::new(s).unwrap())
    }

    #[test]
    fn begin_flips_and_locks() {
        let mut book = ProgressBook::new();
        let mut tracker = ToggleTracker::new();

        let ticket = tracker.begin(&mut book, key("a")).unwrap();
        assert_eq!(ticket.target(), ProgressStatus::Done);
        assert_eq!(ticket.prior(), None);
        assert_eq!(book.status(&key("a")), Some(ProgressStatus::Done));
        assert!(matches!(
            tracker.state(&key("a")),
            EntrySync::PendingWrite { prior: None, target: ProgressStatus::Done }
        ));
    }

    #[test]
    fn second_begin_on_same_key_is_refused() {
        let mut book = ProgressBook::new();
        let mut tracker = ToggleTracker::new();
        let _ticket = tracker.begin(&mut book, key("a")).unwrap();

        let err = tracker.begin(&mut book, key("a")).unwrap_err();
        assert_eq!(err, ToggleError::InFlight(key("a")));
        // book untouched by the refused toggle
        assert_eq!(book.status(&key("a")), Some(ProgressStatus::Done));

        // other keys are independent
        assert!(tracker.begin(&mut book, key("b")).is_ok());
        assert_eq!(tracker.in_flight_count(), 2);
    }

    #[test]
    fn settle_unlocks() {
        let mut book = ProgressBook::new();
        let mut tracker = ToggleTracker::new();
        let ticket = tracker.begin(&mut book, key("a")).unwrap();
        tracker.settle(ticket).unwrap();
        assert_eq!(tracker.state(&key("a")), EntrySync::Synced);
        assert_eq!(book.status(&key("a")), Some(ProgressStatus::Done));
    }

    #[test]
    fn revert_restores_existing_status() {
        let mut book = ProgressBook::new();
        book.set(key("a"), ProgressStatus::Done);
        let before = book.summary();
        let mut tracker = ToggleTracker::new();

        let ticket = tracker.begin(&mut book, key("a")).unwrap();
        assert_eq!(book.status(&key("a")), Some(ProgressStatus::Pending));

        let key_a = tracker.fail(ticket).unwrap();
        assert_eq!(
            tracker.state(&key_a),
            EntrySync::Reverting {
                prior: Some(ProgressStatus::Done)
            }
        );
        assert!(tracker.begin(&mut book, key("a")).is_err());

        tracker.complete_revert(&mut book, &key_a).unwrap();
        assert_eq!(book.status(&key("a")), Some(ProgressStatus::Done));
        assert_eq!(book.summary(), before);
        assert_eq!(tracker.state(&key("a")), EntrySync::Synced);
    }

    #[test]
    fn revert_removes_lazily_created_entry() {
        let mut book = ProgressBook::new();
        let mut tracker = ToggleTracker::new();
        let ticket = tracker.begin(&mut book, key("a")).unwrap();
        assert_eq!(tracker.revert(&mut book, ticket).unwrap(), None);
        assert!(book.is_empty());
    }

    #[test]
    fn toggle_twice_restores_summary() {
        let mut book = ProgressBook::new();
        book.set(key("a"), ProgressStatus::Pending);
        book.set(key("b"), ProgressStatus::Done);
        let before = book.summary();
        let mut tracker = ToggleTracker::new();

        let first = tracker.begin(&mut book, key("a")).unwrap();
        tracker.settle(first).unwrap();
        let second = tracker.begin(&mut book, key("a")).unwrap();
        tracker.settle(second).unwrap();

        assert_eq!(book.summary(), before);
    }

    #[test]
    fn settle_without_pending_write_errors() {
        let mut book = ProgressBook::new();
        let mut tracker = ToggleTracker::new();
        let ticket = tracker.begin(&mut book, key("a")).unwrap();
        tracker.clear();
        assert_eq!(
            tracker.settle(ticket),
            Err(ToggleError::NotInFlight(key("a")))
        );
    }

    #[test]
    fn overlay_keeps_pending_targets() {
        let mut book = ProgressBook::new();
        let mut tracker = ToggleTracker::new();
        let _ticket = tracker.begin(&mut book, key("a")).unwrap();

        let mut fresh = ProgressBook::new();
        fresh.set(key("a"), ProgressStatus::Pending);
        fresh.set(key("b"), ProgressStatus::Done);
        tracker.overlay(&mut fresh);

        assert_eq!(fresh.status(&key("a")), Some(ProgressStatus::Done));
        assert_eq!(fresh.status(&key("b")), Some(ProgressStatus::Done));
    }
}
