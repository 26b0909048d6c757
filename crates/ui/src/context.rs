use services::{AppServices, AppState, PageLoad};

use crate::routes::{GuardOutcome, Route, guard};
use crate::views::ViewState;
use crate::vm::{
    DashboardVm, NoticeVm, ProgressVm, TopicsVm, map_dashboard, map_notices, map_progress,
    map_topics,
};

/// UI-facing handle over the app services: guards routes and loads pages
/// into view models.
#[derive(Clone)]
pub struct AppContext {
    services: AppServices,
}

impl AppContext {
    #[must_use]
    pub fn new(services: AppServices) -> Self {
        Self { services }
    }

    #[must_use]
    pub fn services(&self) -> &AppServices {
        &self.services
    }

    #[must_use]
    pub fn guard(&self, route: &Route) -> GuardOutcome {
        self.services.store().read(|state| guard(route, &state.auth))
    }

    pub async fn dashboard(&self) -> ViewState<DashboardVm> {
        let load = self.services.load_dashboard().await;
        self.settle(&load, map_dashboard)
    }

    pub async fn topics_page(&self) -> ViewState<TopicsVm> {
        let load = self.services.load_topics_page().await;
        self.settle(&load, map_topics)
    }

    pub async fn progress_page(&self) -> ViewState<ProgressVm> {
        let load = self.services.load_progress_page().await;
        self.settle(&load, map_progress)
    }

    /// Topics view from current state, without fetching.
    #[must_use]
    pub fn topics_view(&self) -> TopicsVm {
        self.services.store().read(map_topics)
    }

    /// Notices raised since the last call that have not expired.
    #[must_use]
    pub fn take_notices(&self) -> Vec<NoticeVm> {
        map_notices(&self.services.store().take_notices())
    }

    fn settle<T>(&self, load: &PageLoad, map: impl FnOnce(&AppState) -> T) -> ViewState<T> {
        match load.first_error() {
            Some(err) => ViewState::Error(err.user_message()),
            None => ViewState::Ready(self.services.store().read(map)),
        }
    }
}

/// Build an `AppContext` from the composed app services.
#[must_use]
pub fn build_app_context(services: AppServices) -> AppContext {
    AppContext::new(services)
}
