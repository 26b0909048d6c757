use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{SubtopicId, TopicId};
use crate::model::summary::ProgressSummary;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("invalid progress status: {0}")]
    InvalidStatus(String),
}

/// Completion status of a single subtopic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    #[default]
    Pending,
    Done,
}

impl ProgressStatus {
    /// pending ↔ done
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            ProgressStatus::Pending => ProgressStatus::Done,
            ProgressStatus::Done => ProgressStatus::Pending,
        }
    }

    #[must_use]
    pub fn is_done(self) -> bool {
        matches!(self, ProgressStatus::Done)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::Pending => "pending",
            ProgressStatus::Done => "done",
        }
    }
}

impl FromStr for ProgressStatus {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            _ => Err(ProgressError::InvalidStatus(s.to_owned())),
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one progress entry: a subtopic within its topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgressKey {
    pub topic_id: TopicId,
    pub subtopic_id: SubtopicId,
}

impl ProgressKey {
    #[must_use]
    pub fn new(topic_id: TopicId, subtopic_id: SubtopicId) -> Self {
        Self {
            topic_id,
            subtopic_id,
        }
    }
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.topic_id, self.subtopic_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEntry {
    pub key: ProgressKey,
    pub status: ProgressStatus,
}

impl ProgressEntry {
    #[must_use]
    pub fn new(key: ProgressKey, status: ProgressStatus) -> Self {
        Self { key, status }
    }
}

/// The locally known progress entries, unique per key, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressBook {
    entries: Vec<ProgressEntry>,
}

impl ProgressBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a book from server entries. A repeated key keeps its first
    /// position and its last status.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = ProgressEntry>) -> Self {
        let mut book = Self::new();
        for entry in entries {
            book.set(entry.key, entry.status);
        }
        book
    }

    #[must_use]
    pub fn status(&self, key: &ProgressKey) -> Option<ProgressStatus> {
        self.entries
            .iter()
            .find(|e| &e.key == key)
            .map(|e| e.status)
    }

    /// Status as displayed: entries never touched count as pending.
    #[must_use]
    pub fn displayed_status(&self, key: &ProgressKey) -> ProgressStatus {
        self.status(key).unwrap_or_default()
    }

    /// Sets the status, creating the entry if needed. Returns the previous status.
    pub fn set(&mut self, key: ProgressKey, status: ProgressStatus) -> Option<ProgressStatus> {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.key == key) {
            let previous = existing.status;
            existing.status = status;
            return Some(previous);
        }
        self.entries.push(ProgressEntry::new(key, status));
        None
    }

    pub fn remove(&mut self, key: &ProgressKey) -> Option<ProgressStatus> {
        let index = self.entries.iter().position(|e| &e.key == key)?;
        Some(self.entries.remove(index).status)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgressEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Summary over every locally known entry.
    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary::from_statuses(self.entries.iter().map(|e| e.status))
    }

    /// Summary over the locally known entries of one topic.
    #[must_use]
    pub fn topic_summary(&self, topic_id: &TopicId) -> ProgressSummary {
        ProgressSummary::from_statuses(
            self.entries
                .iter()
                .filter(|e| &e.key.topic_id == topic_id)
                .map(|e| e.status),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(t: &str, s: &str) -> ProgressKey {
        ProgressKey::new(TopicId::new(t).unwrap(), SubtopicId::new(s).unwrap())
    }

    #[test]
    fn status_round_trips_through_str() {
        assert_eq!("done".parse::<ProgressStatus>().unwrap(), ProgressStatus::Done);
        assert_eq!(ProgressStatus::Pending.to_string(), "pending");
        assert!("finished".parse::<ProgressStatus>().is_err());
    }

    #[test]
    fn toggled_flips() {
        assert_eq!(ProgressStatus::Pending.toggled(), ProgressStatus::Done);
        assert_eq!(ProgressStatus::Done.toggled(), ProgressStatus::Pending);
    }

    #[test]
    fn set_creates_lazily_and_reports_previous() {
        let mut book = ProgressBook::new();
        assert_eq!(book.set(key("t", "a"), ProgressStatus::Done), None);
        assert_eq!(
            book.set(key("t", "a"), ProgressStatus::Pending),
            Some(ProgressStatus::Done)
        );
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn displayed_status_defaults_to_pending() {
        let book = ProgressBook::new();
        assert_eq!(book.displayed_status(&key("t", "x")), ProgressStatus::Pending);
    }

    #[test]
    fn from_entries_deduplicates_keys() {
        let book = ProgressBook::from_entries(vec![
            ProgressEntry::new(key("t", "a"), ProgressStatus::Pending),
            ProgressEntry::new(key("t", "b"), ProgressStatus::Done),
            ProgressEntry::new(key("t", "a"), ProgressStatus::Done),
        ]);
        assert_eq!(book.len(), 2);
        assert_eq!(book.status(&key("t", "a")), Some(ProgressStatus::Done));
        assert_eq!(book.iter().next().unwrap().key, key("t", "a"));
    }

    #[test]
    fn topic_summary_filters_by_topic() {
        let mut book = ProgressBook::new();
        book.set(key("t1", "a"), ProgressStatus::Done);
        book.set(key("t1", "b"), ProgressStatus::Pending);
        book.set(key("t2", "c"), ProgressStatus::Done);

        let t1 = book.topic_summary(&TopicId::new("t1").unwrap());
        assert_eq!((t1.total, t1.completed, t1.percentage), (2, 1, 50));
        let all = book.summary();
        assert_eq!((all.total, all.completed, all.pending), (3, 2, 1));
    }

    #[test]
    fn remove_drops_entry() {
        let mut book = ProgressBook::new();
        book.set(key("t", "a"), ProgressStatus::Done);
        assert_eq!(book.remove(&key("t", "a")), Some(ProgressStatus::Done));
        assert!(book.is_empty());
        assert_eq!(book.remove(&key("t", "a")), None);
    }
}
