mod dashboard_vm;
mod notice_vm;
mod progress_vm;
pub mod time_fmt;
mod topics_vm;

pub use dashboard_vm::{DashboardVm, DifficultyVm, SummaryVm, difficulty_rows, map_dashboard};
pub use notice_vm::{NoticeVm, map_notices};
pub use progress_vm::{ProgressVm, TopicProgressVm, map_progress};
pub use topics_vm::{LinkVm, SubtopicVm, TopicVm, TopicsVm, map_topics};
