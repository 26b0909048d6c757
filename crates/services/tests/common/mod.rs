#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use services::{
    ApiError, AppServices, AuthReply, AuthSession, Backend, ClientConfig, Credentials,
    Registration,
};
use storage::repository::{SessionRecord, Storage};
use tokio::sync::Semaphore;
use track_core::SessionToken;
use track_core::model::{
    Difficulty, GoogleProfile, ProgressEntry, ProgressKey, ProgressStatus, ProgressSummary,
    Subtopic, SubtopicId, Topic, TopicId, User, UserId,
};
use track_core::time::{fixed_clock, fixed_now};

/// Status code and optional `{message}` body the fake answers with.
pub type Failure = (u16, Option<&'static str>);

fn failure((code, message): Failure) -> ApiError {
    ApiError::Status {
        status: reqwest::StatusCode::from_u16(code).unwrap(),
        message: message.map(str::to_owned),
    }
}

fn answer<T: Clone>(slot: &Mutex<Result<T, Failure>>) -> Result<T, ApiError> {
    slot.lock().unwrap().clone().map_err(failure)
}

/// Scriptable in-process `Backend`.
pub struct FakeBackend {
    pub login: Mutex<Result<AuthSession, Failure>>,
    pub register: Mutex<Result<AuthReply, Failure>>,
    pub me: Mutex<Result<User, Failure>>,
    pub topics: Mutex<Result<Vec<Topic>, Failure>>,
    pub progress: Mutex<Result<Vec<ProgressEntry>, Failure>>,
    pub summary: Mutex<Result<Option<ProgressSummary>, Failure>>,
    pub update: Mutex<Result<Option<Vec<ProgressEntry>>, Failure>>,
    /// When set, `current_user` and `update_progress` each wait for a permit.
    pub gate: Mutex<Option<Arc<Semaphore>>>,
    pub me_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub updates: Mutex<Vec<ProgressEntry>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            login: Mutex::new(Ok(session(true))),
            register: Mutex::new(Ok(AuthReply::Message("Check your inbox".into()))),
            me: Mutex::new(Ok(user(true))),
            topics: Mutex::new(Ok(vec![topic("arrays", 1, &["two-sum", "three-sum"])])),
            progress: Mutex::new(Ok(Vec::new())),
            summary: Mutex::new(Ok(None)),
            update: Mutex::new(Ok(None)),
            gate: Mutex::new(None),
            me_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            updates: Mutex::new(Vec::new()),
        }
    }
}

impl FakeBackend {
    pub fn set_gate(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
    }

    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn login(&self, _credentials: &Credentials) -> Result<AuthSession, ApiError> {
        answer(&self.login)
    }

    async fn register(&self, _registration: &Registration) -> Result<AuthReply, ApiError> {
        answer(&self.register)
    }

    async fn google_login(&self, _profile: &GoogleProfile) -> Result<AuthSession, ApiError> {
        answer(&self.login)
    }

    async fn forgot_password(&self, _email: &str) -> Result<String, ApiError> {
        Ok("sent".into())
    }

    async fn reset_password(&self, _reset_token: &str, _password: &str) -> Result<String, ApiError> {
        Ok(String::new())
    }

    async fn verify_email(&self, _verification_token: &str) -> Result<AuthReply, ApiError> {
        answer(&self.register)
    }

    async fn current_user(&self, _token: &SessionToken) -> Result<User, ApiError> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        answer(&self.me)
    }

    async fn topics(&self) -> Result<Vec<Topic>, ApiError> {
        answer(&self.topics)
    }

    async fn topic(&self, id: &TopicId) -> Result<Topic, ApiError> {
        let topics = answer(&self.topics)?;
        topics
            .into_iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| failure((404, Some("Topic not found"))))
    }

    async fn progress(&self, _token: &SessionToken) -> Result<Vec<ProgressEntry>, ApiError> {
        answer(&self.progress)
    }

    async fn progress_summary(
        &self,
        _token: &SessionToken,
    ) -> Result<Option<ProgressSummary>, ApiError> {
        answer(&self.summary)
    }

    async fn update_progress(
        &self,
        _token: &SessionToken,
        entry: &ProgressEntry,
    ) -> Result<Option<Vec<ProgressEntry>>, ApiError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().push(entry.clone());
        self.pass_gate().await;
        answer(&self.update)
    }
}

// ─── Fixtures ──────────────────────────────────────────────────────────────────

pub fn user(verified: bool) -> User {
    User {
        id: UserId::new("u1").unwrap(),
        name: "Ada".into(),
        email: "ada@example.com".into(),
        is_verified: verified,
        avatar: None,
    }
}

pub fn session(verified: bool) -> AuthSession {
    AuthSession {
        user: user(verified),
        token: SessionToken::new("token-123").unwrap(),
    }
}

pub fn topic(id: &str, order: i64, subtopics: &[&str]) -> Topic {
    Topic {
        id: TopicId::new(id).unwrap(),
        name: id.to_uppercase(),
        description: String::new(),
        order,
        subtopics: subtopics
            .iter()
            .map(|s| Subtopic {
                id: SubtopicId::new(*s).unwrap(),
                name: (*s).to_owned(),
                difficulty: Difficulty::Easy,
                resources: Vec::new(),
            })
            .collect(),
    }
}

pub fn key(t: &str, s: &str) -> ProgressKey {
    ProgressKey::new(TopicId::new(t).unwrap(), SubtopicId::new(s).unwrap())
}

pub fn entry(t: &str, s: &str, status: ProgressStatus) -> ProgressEntry {
    ProgressEntry::new(key(t, s), status)
}

pub struct Harness {
    pub app: AppServices,
    pub backend: Arc<FakeBackend>,
    pub storage: Storage,
}

impl Harness {
    pub fn new(backend: FakeBackend) -> Self {
        let backend = Arc::new(backend);
        let storage = Storage::in_memory();
        let app = AppServices::with_backend(
            &ClientConfig::default(),
            storage.clone(),
            Arc::clone(&backend) as Arc<dyn Backend>,
            fixed_clock(),
        );
        Self {
            app,
            backend,
            storage,
        }
    }

    /// Harness with a token already persisted, as after a previous run.
    pub async fn signed_in(backend: FakeBackend) -> Self {
        let harness = Self::new(backend);
        harness.persist_token("token-123").await;
        harness
    }

    pub async fn persist_token(&self, token: &str) {
        self.storage
            .sessions
            .save_session(&SessionRecord {
                token: SessionToken::new(token).unwrap(),
                saved_at: fixed_now(),
            })
            .await
            .unwrap();
    }

    pub async fn stored_token(&self) -> Option<SessionToken> {
        self.storage.sessions.load_token().await.unwrap()
    }
}
