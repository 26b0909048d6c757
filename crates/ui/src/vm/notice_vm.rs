use serde::Serialize;
use track_core::model::Notice;

use crate::vm::time_fmt::format_datetime;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NoticeVm {
    pub id: String,
    pub level: &'static str,
    pub message: String,
    pub created_at_str: String,
}

impl From<&Notice> for NoticeVm {
    fn from(notice: &Notice) -> Self {
        Self {
            id: notice.id.to_string(),
            level: notice.level.as_str(),
            message: notice.message.clone(),
            created_at_str: format_datetime(notice.created_at),
        }
    }
}

#[must_use]
pub fn map_notices(notices: &[Notice]) -> Vec<NoticeVm> {
    notices.iter().map(NoticeVm::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use track_core::model::{NoticeBoard, NoticeLevel};
    use track_core::time::fixed_now;

    #[test]
    fn maps_level_and_timestamp() {
        let mut board = NoticeBoard::new(Duration::seconds(5));
        board.push(NoticeLevel::Warning, "Please verify your email", fixed_now());

        let vms = map_notices(&board.drain());

        assert_eq!(vms.len(), 1);
        assert_eq!(vms[0].level, "warning");
        assert_eq!(vms[0].message, "Please verify your email");
        assert_eq!(vms[0].created_at_str, "2023-11-14 22:13:20 UTC");
    }
}
