//! `tracker`: terminal front end for the learning-progress tracker.
//!
//! # Environment variables
//!
//! | Variable                    | Default                     |
//! |-----------------------------|-----------------------------|
//! | `TRACKER_API_URL`           | `http://localhost:5000/api` |
//! | `TRACKER_DB_URL`            | `sqlite://tracker.sqlite3`  |
//! | `TRACKER_HTTP_TIMEOUT_SECS` | `30`                        |
//! | `TRACKER_NOTICE_TTL_SECS`   | `5`                         |
//! | `RUST_LOG`                  | `tracker=info,services=info`|

mod cli;
mod render;

use anyhow::{Context, bail};
use clap::Parser;
use serde::Serialize;
use services::{
    AppServices, AuthOutcome, ClientConfig, Clock, Credentials, Registration, ToggleOutcome,
};
use track_core::model::{GoogleProfile, ProgressKey, SubtopicId, TopicId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ui::{AppContext, GuardOutcome, Route, ViewState, build_app_context};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker=info,services=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env().context("loading configuration")?;
    if let Some(api_url) = cli.api_url {
        config = config
            .with_api_url(&api_url)
            .context("invalid --api-url value")?;
    }

    let db_url = normalize_sqlite_url(&cli.db);
    prepare_sqlite_file(&db_url)?;
    let services = AppServices::new_sqlite(&db_url, &config, Clock::system())
        .await
        .with_context(|| format!("opening session store at {db_url}"))?;
    let context = build_app_context(services);

    let phase = context.services().bootstrap().await?;
    tracing::debug!(?phase, "session resolved");

    if let Some(route) = cli.command.route() {
        let outcome = context.guard(&route);
        if outcome != GuardOutcome::Render {
            println!("{}", render::guard(&route, &outcome));
            print_notices(&context);
            return Ok(());
        }
    }

    let result = execute(&context, cli.command, cli.json).await;
    print_notices(&context);
    result
}

async fn execute(context: &AppContext, command: Command, json: bool) -> anyhow::Result<()> {
    let services = context.services();
    let auth = services.auth();
    match command {
        Command::Login(args) => {
            let credentials = Credentials {
                email: args.email,
                password: args.password,
            };
            report(&auth.login(&credentials).await?);
        }
        Command::Signup(args) => {
            let registration = Registration {
                name: args.name,
                email: args.email,
                password: args.password,
            };
            report(&auth.signup(&registration).await?);
        }
        Command::GoogleLogin(args) => {
            let profile = GoogleProfile {
                name: args.name,
                email: args.email,
                google_id: args.google_id,
                avatar: args.avatar,
            };
            report(&auth.google_login(&profile).await?);
        }
        Command::Logout => auth.logout().await?,
        Command::Whoami => {
            let state = services.store().snapshot().auth;
            match state.user {
                Some(user) => {
                    let verified = if user.is_verified { "verified" } else { "unverified" };
                    println!("{} <{}> ({verified})", user.display_name(), user.email);
                }
                None => println!("{:?}", state.phase()),
            }
        }
        Command::ForgotPassword { email } => report(&auth.forgot_password(&email).await?),
        Command::ResetPassword { token, password } => {
            report(&auth.reset_password(&token, &password).await?);
        }
        Command::VerifyEmail { token } => report(&auth.verify_email(&token).await?),
        Command::Topics => show(context.topics_page().await, json, render::topics)?,
        Command::Toggle {
            topic_id,
            subtopic_id,
        } => toggle(context, topic_id, subtopic_id, json).await?,
        Command::Progress => show(context.progress_page().await, json, render::progress)?,
        Command::Dashboard => show(context.dashboard().await, json, render::dashboard)?,
        Command::Route { path } => {
            let route = Route::parse(&path);
            println!("{}", render::guard(&route, &context.guard(&route)));
        }
    }
    Ok(())
}

async fn toggle(
    context: &AppContext,
    topic_id: String,
    subtopic_id: String,
    json: bool,
) -> anyhow::Result<()> {
    let key = ProgressKey::new(TopicId::new(topic_id)?, SubtopicId::new(subtopic_id)?);
    let services = context.services();

    // The flip is relative to the server's current status.
    let load = services.load_topics_page().await;
    if let Some(err) = load.first_error() {
        bail!(err.user_message());
    }
    if !services.store().read(|s| s.topics.catalog.contains(&key)) {
        bail!("unknown subtopic {key}");
    }

    match services.progress().toggle(key.clone()).await {
        ToggleOutcome::Synced(status) => {
            tracing::info!(%key, %status, "progress updated");
            show(ViewState::Ready(context.topics_view()), json, render::topics)
        }
        ToggleOutcome::Busy => {
            println!("{key}: an update is already in progress");
            Ok(())
        }
        ToggleOutcome::Reverted { message, .. } => bail!(message),
    }
}

fn report(outcome: &AuthOutcome) {
    match outcome {
        AuthOutcome::SignedIn(user) => println!("Signed in as {}", user.display_name()),
        AuthOutcome::Unverified => println!("Email not verified; no session was kept."),
        AuthOutcome::Message(message) => println!("{message}"),
    }
}

fn show<T: Serialize>(
    state: ViewState<T>,
    json: bool,
    text: fn(&T) -> String,
) -> anyhow::Result<()> {
    match state {
        ViewState::Ready(vm) if json => println!("{}", serde_json::to_string_pretty(&vm)?),
        ViewState::Ready(vm) => print!("{}", text(&vm)),
        ViewState::Error(message) => bail!(message),
        ViewState::Idle | ViewState::Loading => println!("loading"),
    }
    Ok(())
}

fn print_notices(context: &AppContext) {
    for notice in context.take_notices() {
        eprintln!("{}", render::notice(&notice));
    }
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .with_context(|| format!("invalid --db value: {db_url}"))?;
    let path = path.split('?').next().unwrap_or(path);
    anyhow::ensure!(!path.is_empty(), "invalid --db value: {db_url}");

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }
    Ok(())
}
