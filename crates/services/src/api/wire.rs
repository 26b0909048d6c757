//! JSON shapes exchanged with the backend and their domain conversions.

use serde::{Deserialize, Serialize};
use track_core::SessionToken;
use track_core::model::{
    Difficulty, ProgressEntry, ProgressKey, ProgressStatus, ProgressSummary, ResourceKind,
    ResourceLink, Subtopic, SubtopicId, Topic, TopicId, User, UserId,
};

use super::{AuthReply, AuthSession};
use crate::error::ApiError;

// ─── Requests ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleLoginBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub google_id: &'a str,
    pub avatar: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmailBody<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResetPasswordBody<'a> {
    pub token: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenBody<'a> {
    pub token: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProgressEntryDto {
    pub topic_id: String,
    pub subtopic_id: String,
    pub status: ProgressStatus,
}

impl From<&ProgressEntry> for ProgressEntryDto {
    fn from(entry: &ProgressEntry) -> Self {
        Self {
            topic_id: entry.key.topic_id.as_str().to_owned(),
            subtopic_id: entry.key.subtopic_id.as_str().to_owned(),
            status: entry.status,
        }
    }
}

impl ProgressEntryDto {
    pub(crate) fn into_entry(self) -> Result<ProgressEntry, ApiError> {
        let key = ProgressKey::new(
            TopicId::new(self.topic_id).map_err(track_core::Error::from)?,
            SubtopicId::new(self.subtopic_id).map_err(track_core::Error::from)?,
        );
        Ok(ProgressEntry::new(key, self.status))
    }
}

// ─── Responses ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserDto {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl UserDto {
    pub(crate) fn into_user(self) -> Result<User, ApiError> {
        Ok(User {
            id: UserId::new(self.id).map_err(track_core::Error::from)?,
            name: self.name,
            email: self.email,
            is_verified: self.is_verified,
            avatar: self.avatar.filter(|a| !a.trim().is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(default)]
    pub user: Option<UserDto>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    pub(crate) fn into_reply(self) -> Result<AuthReply, ApiError> {
        match (self.user, self.token) {
            (Some(user), Some(token)) => Ok(AuthReply::Session(AuthSession {
                user: user.into_user()?,
                token: SessionToken::new(token).map_err(track_core::Error::from)?,
            })),
            _ => Ok(AuthReply::Message(self.message.unwrap_or_default())),
        }
    }

    pub(crate) fn into_session(self) -> Result<AuthSession, ApiError> {
        let user = self.user.ok_or(ApiError::MissingField("user"))?;
        let token = self.token.ok_or(ApiError::MissingField("token"))?;
        Ok(AuthSession {
            user: user.into_user()?,
            token: SessionToken::new(token).map_err(track_core::Error::from)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MeResponse {
    pub user: UserDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubtopicDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub leet_code_link: String,
    #[serde(default)]
    pub youtube_link: String,
    #[serde(default)]
    pub article_link: String,
    pub level: String,
}

impl SubtopicDto {
    /// `Ok(None)` when the level is not one the client knows.
    fn into_subtopic(self) -> Result<Option<Subtopic>, ApiError> {
        let Ok(difficulty) = self.level.parse::<Difficulty>() else {
            tracing::debug!(
                subtopic = %self.id,
                level = %self.level,
                "dropping subtopic with unknown level"
            );
            return Ok(None);
        };
        let resources = [
            (ResourceKind::LeetCode, self.leet_code_link),
            (ResourceKind::YouTube, self.youtube_link),
            (ResourceKind::Article, self.article_link),
        ]
        .into_iter()
        .filter_map(|(kind, raw)| {
            let link = ResourceLink::parse(kind, &raw);
            if link.is_none() && !raw.trim().is_empty() {
                tracing::debug!(subtopic = %self.id, kind = kind.label(), raw, "dropping malformed resource link");
            }
            link
        })
        .collect();

        Ok(Some(Subtopic {
            id: SubtopicId::new(self.id).map_err(track_core::Error::from)?,
            name: self.name,
            difficulty,
            resources,
        }))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopicDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub subtopics: Vec<SubtopicDto>,
}

impl TopicDto {
    pub(crate) fn into_topic(self) -> Result<Topic, ApiError> {
        let subtopics = self
            .subtopics
            .into_iter()
            .map(SubtopicDto::into_subtopic)
            .filter_map(Result::transpose)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Topic {
            id: TopicId::new(self.id).map_err(track_core::Error::from)?,
            name: self.name,
            description: self.description,
            order: self.order,
            subtopics,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopicsResponse {
    #[serde(default)]
    pub topics: Vec<TopicDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopicResponse {
    pub topic: TopicDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressResponse {
    #[serde(default)]
    pub progress: Option<Vec<ProgressEntryDto>>,
}

impl ProgressResponse {
    pub(crate) fn into_entries(self) -> Result<Option<Vec<ProgressEntry>>, ApiError> {
        self.progress
            .map(|entries| {
                entries
                    .into_iter()
                    .map(ProgressEntryDto::into_entry)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
    }
}

/// Missing and `null` fields both read as zero.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct SummaryDto {
    pub total_subtopics: Option<u32>,
    pub total_completed: Option<u32>,
    pub total_pending: Option<u32>,
    pub overall_completion_percentage: Option<f64>,
}

impl From<SummaryDto> for ProgressSummary {
    fn from(dto: SummaryDto) -> Self {
        let percentage = match dto.overall_completion_percentage {
            Some(raw) if raw.is_finite() => raw.round().clamp(0.0, 100.0) as u32,
            _ => 0,
        };
        ProgressSummary {
            total: dto.total_subtopics.unwrap_or(0),
            completed: dto.total_completed.unwrap_or(0),
            pending: dto.total_pending.unwrap_or(0),
            percentage,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryResponse {
    #[serde(default)]
    pub summary: Option<SummaryDto>,
}
