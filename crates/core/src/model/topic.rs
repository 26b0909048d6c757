use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::{SubtopicId, TopicId};
use crate::model::progress::{ProgressBook, ProgressKey, ProgressStatus};
use crate::model::summary::DifficultyBreakdown;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("unknown difficulty level: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty level of a subtopic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Upper-case badge label shown next to a subtopic.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

impl FromStr for Difficulty {
    type Err = TopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(TopicError::UnknownDifficulty(s.to_owned())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── RESOURCES ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    LeetCode,
    YouTube,
    Article,
}

impl ResourceKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::LeetCode => "LeetCode",
            ResourceKind::YouTube => "YouTube",
            ResourceKind::Article => "Article",
        }
    }
}

/// External study material attached to a subtopic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLink {
    pub kind: ResourceKind,
    pub url: Url,
}

impl ResourceLink {
    /// Parses a raw link. Blank or malformed links yield `None`.
    #[must_use]
    pub fn parse(kind: ResourceKind, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Url::parse(raw).ok().map(|url| Self { kind, url })
    }
}

//
// ─── TOPICS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtopic {
    pub id: SubtopicId,
    pub name: String,
    pub difficulty: Difficulty,
    pub resources: Vec<ResourceLink>,
}

impl Subtopic {
    #[must_use]
    pub fn resource(&self, kind: ResourceKind) -> Option<&ResourceLink> {
        self.resources.iter().find(|link| link.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    pub description: String,
    pub order: i64,
    pub subtopics: Vec<Subtopic>,
}

impl Topic {
    #[must_use]
    pub fn subtopic(&self, id: &SubtopicId) -> Option<&Subtopic> {
        self.subtopics.iter().find(|s| &s.id == id)
    }

    /// Progress keys for every subtopic of this topic, in display order.
    pub fn keys(&self) -> impl Iterator<Item = ProgressKey> + '_ {
        self.subtopics
            .iter()
            .map(|s| ProgressKey::new(self.id.clone(), s.id.clone()))
    }

    /// Difficulty and displayed status of every subtopic.
    fn statuses<'a>(
        &'a self,
        book: &'a ProgressBook,
    ) -> impl Iterator<Item = (Difficulty, ProgressStatus)> + 'a {
        self.subtopics
            .iter()
            .zip(self.keys())
            .map(|(subtopic, key)| (subtopic.difficulty, book.displayed_status(&key)))
    }

    /// Completion per difficulty over every subtopic of this topic.
    /// Untouched subtopics count as pending.
    #[must_use]
    pub fn difficulty_breakdown(&self, book: &ProgressBook) -> DifficultyBreakdown {
        DifficultyBreakdown::from_statuses(self.statuses(book))
    }
}

/// Read-only cache of the server's topic catalog, kept sorted by `order`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
}

impl TopicCatalog {
    #[must_use]
    pub fn from_topics(mut topics: Vec<Topic>) -> Self {
        topics.sort_by_key(|t| t.order);
        Self { topics }
    }

    /// Replaces a topic with the same id or appends it.
    pub fn upsert(&mut self, topic: Topic) {
        match self.topics.iter_mut().find(|t| t.id == topic.id) {
            Some(existing) => *existing = topic,
            None => self.topics.push(topic),
        }
        self.topics.sort_by_key(|t| t.order);
    }

    #[must_use]
    pub fn get(&self, id: &TopicId) -> Option<&Topic> {
        self.topics.iter().find(|t| &t.id == id)
    }

    #[must_use]
    pub fn contains(&self, key: &ProgressKey) -> bool {
        self.get(&key.topic_id)
            .is_some_and(|t| t.subtopic(&key.subtopic_id).is_some())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    #[must_use]
    pub fn subtopic_count(&self) -> usize {
        self.topics.iter().map(|t| t.subtopics.len()).sum()
    }

    /// Completion per difficulty across the whole catalog.
    #[must_use]
    pub fn difficulty_breakdown(&self, book: &ProgressBook) -> DifficultyBreakdown {
        DifficultyBreakdown::from_statuses(self.topics.iter().flat_map(|t| t.statuses(book)))
    }
}
