use chrono::{DateTime, Duration, Utc};

use crate::model::ids::NoticeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// A transient, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Queue of notices that expire after a fixed time to live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeBoard {
    ttl: Duration,
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub const DEFAULT_TTL_SECS: i64 = 5;

    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            notices: Vec::new(),
        }
    }

    pub fn push(
        &mut self,
        level: NoticeLevel,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> NoticeId {
        let id = NoticeId::generate();
        self.notices.push(Notice {
            id,
            level,
            message: message.into(),
            created_at: now,
        });
        id
    }

    pub fn dismiss(&mut self, id: NoticeId) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Drops notices older than the time to live.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.notices.retain(|n| now - n.created_at < ttl);
    }

    /// Hands every queued notice to the caller.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(Duration::seconds(Self::DEFAULT_TTL_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn notices_expire_after_ttl() {
        let mut board = NoticeBoard::default();
        let now = fixed_now();
        board.push(NoticeLevel::Error, "Failed to fetch topics", now);
        board.push(NoticeLevel::Success, "Login successful!", now + Duration::seconds(3));

        board.prune(now + Duration::seconds(4));
        assert_eq!(board.len(), 2);
        board.prune(now + Duration::seconds(5));
        assert_eq!(board.len(), 1);
        assert_eq!(board.drain()[0].level, NoticeLevel::Success);
    }

    #[test]
    fn dismiss_and_drain() {
        let mut board = NoticeBoard::default();
        let id = board.push(NoticeLevel::Info, "a", fixed_now());
        board.push(NoticeLevel::Warning, "b", fixed_now());
        assert!(board.dismiss(id));
        assert!(!board.dismiss(id));
        let drained = board.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].message, "b");
        assert!(board.is_empty());
    }
}
