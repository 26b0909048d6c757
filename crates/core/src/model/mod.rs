mod ids;
mod notice;
mod progress;
mod summary;
mod topic;
mod user;

pub use ids::{NoticeId, ParseIdError, SubtopicId, TopicId, UserId};
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use progress::{ProgressBook, ProgressEntry, ProgressError, ProgressKey, ProgressStatus};
pub use summary::{DifficultyBreakdown, ProgressSummary, SummaryView, completion_percentage};
pub use topic::{
    Difficulty, ResourceKind, ResourceLink, Subtopic, Topic, TopicCatalog, TopicError,
};
pub use user::{GoogleProfile, User};
