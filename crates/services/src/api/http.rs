use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use track_core::SessionToken;
use track_core::model::{GoogleProfile, ProgressEntry, ProgressSummary, Topic, TopicId, User};

use super::wire::{
    AuthResponse, EmailBody, ErrorBody, GoogleLoginBody, LoginBody, MeResponse, MessageResponse,
    ProgressEntryDto, ProgressResponse, RegisterBody, ResetPasswordBody, SummaryResponse,
    TokenBody, TopicResponse, TopicsResponse,
};
use super::{AuthReply, AuthSession, Backend, Credentials, Registration};
use crate::config::ClientConfig;
use crate::error::ApiError;

/// `Backend` over HTTP/JSON.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns `ApiError::InvalidBaseUrl` if the configured URL cannot carry
    /// a path, or `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidBaseUrl(config.api_url.clone()))?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL extended by `segments`, each percent-encoded as one segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&SessionToken>,
    ) -> RequestBuilder {
        let url = self.endpoint(segments);
        tracing::debug!(%method, %url, authenticated = token.is_some(), "api request");
        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &[&str],
        token: Option<&SessionToken>,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path, token).send().await?;
        decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        token: Option<&SessionToken>,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(method, path, token).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.trim().is_empty());
        tracing::debug!(%status, ?message, "api request rejected");
        return Err(ApiError::Status { status, message });
    }
    Ok(response.json().await?)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        let body = LoginBody {
            email: &credentials.email,
            password: &credentials.password,
        };
        let resp: AuthResponse = self
            .send_json(Method::POST, &["auth", "login"], None, &body)
            .await?;
        resp.into_session()
    }

    async fn register(&self, registration: &Registration) -> Result<AuthReply, ApiError> {
        let body = RegisterBody {
            name: &registration.name,
            email: &registration.email,
            password: &registration.password,
        };
        let resp: AuthResponse = self
            .send_json(Method::POST, &["auth", "register"], None, &body)
            .await?;
        resp.into_reply()
    }

    async fn google_login(&self, profile: &GoogleProfile) -> Result<AuthSession, ApiError> {
        let body = GoogleLoginBody {
            name: &profile.name,
            email: &profile.email,
            google_id: &profile.google_id,
            avatar: profile.avatar.as_deref().unwrap_or_default(),
        };
        let resp: AuthResponse = self
            .send_json(Method::POST, &["auth", "google-login"], None, &body)
            .await?;
        resp.into_session()
    }

    async fn forgot_password(&self, email: &str) -> Result<String, ApiError> {
        let resp: MessageResponse = self
            .send_json(Method::POST, &["auth", "forgot-password"], None, &EmailBody { email })
            .await?;
        Ok(resp.message.unwrap_or_default())
    }

    async fn reset_password(&self, reset_token: &str, password: &str) -> Result<String, ApiError> {
        let body = ResetPasswordBody {
            token: reset_token,
            password,
        };
        let resp: MessageResponse = self
            .send_json(Method::POST, &["auth", "reset-password"], None, &body)
            .await?;
        Ok(resp.message.unwrap_or_default())
    }

    async fn verify_email(&self, verification_token: &str) -> Result<AuthReply, ApiError> {
        let body = TokenBody {
            token: verification_token,
        };
        let resp: AuthResponse = self
            .send_json(Method::POST, &["auth", "verify-email"], None, &body)
            .await?;
        resp.into_reply()
    }

    async fn current_user(&self, token: &SessionToken) -> Result<User, ApiError> {
        let resp: MeResponse = self.get(&["auth", "me"], Some(token)).await?;
        resp.user.into_user()
    }

    async fn topics(&self) -> Result<Vec<Topic>, ApiError> {
        let resp: TopicsResponse = self.get(&["topics"], None).await?;
        resp.topics.into_iter().map(|dto| dto.into_topic()).collect()
    }

    async fn topic(&self, id: &TopicId) -> Result<Topic, ApiError> {
        let resp: TopicResponse = self.get(&["topics", id.as_str()], None).await?;
        resp.topic.into_topic()
    }

    async fn progress(&self, token: &SessionToken) -> Result<Vec<ProgressEntry>, ApiError> {
        let resp: ProgressResponse = self.get(&["progress", ""], Some(token)).await?;
        Ok(resp.into_entries()?.unwrap_or_default())
    }

    async fn progress_summary(
        &self,
        token: &SessionToken,
    ) -> Result<Option<ProgressSummary>, ApiError> {
        let resp: SummaryResponse = self.get(&["progress", "summary"], Some(token)).await?;
        Ok(resp.summary.map(ProgressSummary::from))
    }

    async fn update_progress(
        &self,
        token: &SessionToken,
        entry: &ProgressEntry,
    ) -> Result<Option<Vec<ProgressEntry>>, ApiError> {
        let body = ProgressEntryDto::from(entry);
        let resp: ProgressResponse = self
            .send_json(Method::PUT, &["progress", "update"], Some(token), &body)
            .await?;
        resp.into_entries()
    }
}
