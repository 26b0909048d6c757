use clap::{Args, Parser, Subcommand};
use ui::Route;

#[derive(Debug, Parser)]
#[command(name = "tracker", version, about = "Track progress through a topic catalog")]
pub struct Cli {
    /// Backend base URL, e.g. `http://localhost:5000/api`.
    #[arg(long, global = true, env = "TRACKER_API_URL")]
    pub api_url: Option<String>,

    /// `SQLite` database holding the persisted session.
    #[arg(
        long,
        global = true,
        env = "TRACKER_DB_URL",
        default_value = "sqlite://tracker.sqlite3"
    )]
    pub db: String,

    /// Print view models as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password.
    Login(LoginArgs),
    /// Create an account.
    Signup(SignupArgs),
    /// Sign in with a Google profile.
    GoogleLogin(GoogleArgs),
    /// Sign out and forget the stored session.
    Logout,
    /// Show the current session.
    Whoami,
    /// Request a password reset email.
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with a reset token.
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long, env = "TRACKER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Confirm an email address.
    VerifyEmail {
        #[arg(long)]
        token: String,
    },
    /// List topics with per-subtopic status.
    Topics,
    /// Flip a subtopic between pending and done.
    Toggle {
        topic_id: String,
        subtopic_id: String,
    },
    /// Show overall and per-topic completion.
    Progress,
    /// Show the dashboard summary.
    Dashboard,
    /// Show what the route guard decides for a path.
    Route { path: String },
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "TRACKER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "TRACKER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct GoogleArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub google_id: String,
    #[arg(long)]
    pub avatar: Option<String>,
}

impl Command {
    /// The page this command stands in for, if it is guarded.
    pub fn route(&self) -> Option<Route> {
        match self {
            Command::Login(_) | Command::GoogleLogin(_) => Some(Route::Login),
            Command::Signup(_) => Some(Route::Signup),
            Command::ForgotPassword { .. } => Some(Route::ForgotPassword),
            Command::ResetPassword { token, .. } => Some(Route::ResetPassword {
                token: Some(token.clone()),
            }),
            Command::VerifyEmail { token } => Some(Route::VerifyEmail {
                token: Some(token.clone()),
            }),
            Command::Topics | Command::Toggle { .. } => Some(Route::Topics),
            Command::Progress => Some(Route::Progress),
            Command::Dashboard => Some(Route::Dashboard),
            Command::Logout | Command::Whoami | Command::Route { .. } => None,
        }
    }
}
