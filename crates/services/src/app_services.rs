use std::sync::Arc;

use storage::repository::Storage;
use track_core::{Clock, SessionPhase};

use crate::api::{Backend, HttpBackend};
use crate::auth_service::AuthService;
use crate::config::ClientConfig;
use crate::error::{AppServicesError, ServiceError};
use crate::progress_service::ProgressService;
use crate::session::SessionKeeper;
use crate::store::Store;
use crate::topic_service::TopicService;

/// Page loads that ran side by side; each keeps its own result.
#[derive(Debug)]
pub struct PageLoad {
    pub topics: Result<usize, ServiceError>,
    pub progress: Option<Result<usize, ServiceError>>,
    pub summary: Option<Result<(), ServiceError>>,
}

impl PageLoad {
    /// First failure, if any request failed.
    #[must_use]
    pub fn first_error(&self) -> Option<&ServiceError> {
        [
            self.topics.as_ref().err(),
            self.progress.as_ref().and_then(|r| r.as_ref().err()),
            self.summary.as_ref().and_then(|r| r.as_ref().err()),
        ]
        .into_iter()
        .flatten()
        .next()
    }
}

/// Assembles the store and the app-facing services around one backend.
#[derive(Clone)]
pub struct AppServices {
    store: Store,
    auth: Arc<AuthService>,
    topics: Arc<TopicService>,
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Build services backed by `SQLite` session storage and the HTTP API.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// HTTP client cannot be built.
    pub async fn new_sqlite(
        db_url: &str,
        config: &ClientConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::new(config, storage, clock)
    }

    /// # Errors
    ///
    /// Returns `AppServicesError::Api` if the HTTP client cannot be built.
    pub fn new(
        config: &ClientConfig,
        storage: Storage,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(config)?);
        tracing::debug!(api_url = %config.api_url, "http backend ready");
        Ok(Self::with_backend(config, storage, backend, clock))
    }

    #[must_use]
    pub fn with_backend(
        config: &ClientConfig,
        storage: Storage,
        backend: Arc<dyn Backend>,
        clock: Clock,
    ) -> Self {
        let store = Store::new(config.notice_ttl, clock);
        let session = SessionKeeper::new(store.clone(), Arc::clone(&storage.sessions));
        let auth = Arc::new(AuthService::new(
            store.clone(),
            Arc::clone(&backend),
            session.clone(),
        ));
        let topics = Arc::new(TopicService::new(store.clone(), Arc::clone(&backend)));
        let progress = Arc::new(ProgressService::new(store.clone(), backend, session));
        Self {
            store,
            auth,
            topics,
            progress,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn topics(&self) -> Arc<TopicService> {
        Arc::clone(&self.topics)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    /// Restores the persisted token and resolves its user.
    ///
    /// A failed resolution is not an error here: the session has been
    /// cleared and the returned phase says so.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the session store cannot be read.
    pub async fn bootstrap(&self) -> Result<SessionPhase, ServiceError> {
        self.auth.restore().await?;
        match self.auth.reconcile().await {
            Ok(phase) => Ok(phase),
            Err(ServiceError::Storage(err)) => Err(ServiceError::Storage(err)),
            Err(_) => Ok(self.auth.phase()),
        }
    }

    /// Dashboard: same loads as the progress page, since the difficulty
    /// breakdown needs both the catalog and the entries.
    pub async fn load_dashboard(&self) -> PageLoad {
        self.load_progress_page().await
    }

    /// Topics page: catalog and the entries to show statuses against.
    pub async fn load_topics_page(&self) -> PageLoad {
        let (topics, progress) =
            tokio::join!(self.topics.fetch_topics(), self.progress.fetch_progress());
        PageLoad {
            topics,
            progress: Some(progress),
            summary: None,
        }
    }

    /// Progress page: catalog and entries, then the server summary so the
    /// authoritative numbers are the ones left on display.
    pub async fn load_progress_page(&self) -> PageLoad {
        let (topics, progress) =
            tokio::join!(self.topics.fetch_topics(), self.progress.fetch_progress());
        let summary = self.progress.fetch_summary().await.map(|_| ());
        PageLoad {
            topics,
            progress: Some(progress),
            summary: Some(summary),
        }
    }
}
