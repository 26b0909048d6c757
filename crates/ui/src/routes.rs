//! Route set and the authentication gate in front of it.

use std::fmt;

use services::store::AuthState;
use track_core::SessionPhase;
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Signup,
    ForgotPassword,
    ResetPassword { token: Option<String> },
    VerifyEmail { token: Option<String> },
    Dashboard,
    Topics,
    Progress,
    NotFound { path: String },
}

/// Who may see a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Everyone, whatever the session.
    Open,
    /// Signed-out visitors; signed-in users are sent to the dashboard.
    Public,
    /// Signed-in, verified users only.
    Protected,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Render,
    /// The session is still being resolved.
    Loading,
    Redirect(Route),
}

impl Route {
    /// Parses a path with optional query, e.g. `/verify-email?token=abc`.
    /// Anything unrecognised becomes `NotFound`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let not_found = || Route::NotFound {
            path: raw.to_owned(),
        };
        let Ok(url) = Url::parse("http://localhost/").and_then(|base| base.join(raw.trim()))
        else {
            return not_found();
        };
        let token = || {
            url.query_pairs()
                .find(|(k, _)| k == "token")
                .map(|(_, v)| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        match url.path().trim_end_matches('/') {
            "" => Route::Landing,
            "/login" => Route::Login,
            "/signup" => Route::Signup,
            "/forgot-password" => Route::ForgotPassword,
            "/reset-password" => Route::ResetPassword { token: token() },
            "/verify-email" => Route::VerifyEmail { token: token() },
            "/dashboard" => Route::Dashboard,
            "/topics" => Route::Topics,
            "/progress" => Route::Progress,
            _ => not_found(),
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        let with_token = |base: &str, token: &Option<String>| match token {
            Some(token) => {
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("token", token)
                    .finish();
                format!("{base}?{query}")
            }
            None => base.to_owned(),
        };
        match self {
            Route::Landing => "/".into(),
            Route::Login => "/login".into(),
            Route::Signup => "/signup".into(),
            Route::ForgotPassword => "/forgot-password".into(),
            Route::ResetPassword { token } => with_token("/reset-password", token),
            Route::VerifyEmail { token } => with_token("/verify-email", token),
            Route::Dashboard => "/dashboard".into(),
            Route::Topics => "/topics".into(),
            Route::Progress => "/progress".into(),
            Route::NotFound { path } => path.clone(),
        }
    }

    #[must_use]
    pub fn access(&self) -> Access {
        match self {
            Route::Landing | Route::NotFound { .. } => Access::Open,
            Route::Login
            | Route::Signup
            | Route::ForgotPassword
            | Route::ResetPassword { .. }
            | Route::VerifyEmail { .. } => Access::Public,
            Route::Dashboard | Route::Topics | Route::Progress => Access::Protected,
        }
    }

    /// Routes that only make sense with a `token` query parameter.
    fn missing_token(&self) -> bool {
        matches!(
            self,
            Route::ResetPassword { token: None } | Route::VerifyEmail { token: None }
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Decides what to show for `route` given the auth slice.
#[must_use]
pub fn guard(route: &Route, auth: &AuthState) -> GuardOutcome {
    guard_phase(route, auth.phase())
}

#[must_use]
pub fn guard_phase(route: &Route, phase: SessionPhase) -> GuardOutcome {
    if matches!(route, Route::NotFound { .. }) {
        return GuardOutcome::Redirect(Route::Landing);
    }
    let outcome = match (route.access(), phase) {
        (Access::Open, _) => GuardOutcome::Render,
        (_, SessionPhase::Resolving) => GuardOutcome::Loading,
        (Access::Public, SessionPhase::Authenticated) => GuardOutcome::Redirect(Route::Dashboard),
        (Access::Public, _) => GuardOutcome::Render,
        (Access::Protected, SessionPhase::Authenticated) => GuardOutcome::Render,
        (Access::Protected, _) => GuardOutcome::Redirect(Route::Login),
    };
    if outcome == GuardOutcome::Render && route.missing_token() {
        return GuardOutcome::Redirect(Route::Login);
    }
    outcome
}
