use chrono::Duration;
use storage::repository::{SessionRecord, SessionStore, Storage};
use storage::sqlite::SqliteRepository;
use track_core::SessionToken;
use track_core::time::fixed_now;

fn record(token: &str) -> SessionRecord {
    SessionRecord {
        token: SessionToken::new(token).unwrap(),
        saved_at: fixed_now(),
    }
}

#[tokio::test]
async fn sqlite_session_roundtrip() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_session_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load_session().await.unwrap().is_none());

    repo.save_session(&record("first-token")).await.unwrap();
    let loaded = repo.load_session().await.unwrap().expect("session saved");
    assert_eq!(loaded.token.as_str(), "first-token");
    assert_eq!(loaded.saved_at, fixed_now());

    let later = SessionRecord {
        token: SessionToken::new("second-token").unwrap(),
        saved_at: fixed_now() + Duration::minutes(5),
    };
    repo.save_session(&later).await.unwrap();
    let loaded = repo.load_session().await.unwrap().expect("session replaced");
    assert_eq!(loaded, later);
}

#[tokio::test]
async fn sqlite_clear_session_is_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_session_clear?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save_session(&record("to-clear")).await.unwrap();
    repo.clear_session().await.unwrap();
    repo.clear_session().await.unwrap();
    assert!(repo.load_token().await.unwrap().is_none());
}

#[tokio::test]
async fn migrations_can_run_twice() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_session_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_sqlite_exposes_session_store() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage_facade?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.sessions.save_session(&record("facade")).await.unwrap();
    let token = storage.sessions.load_token().await.unwrap().unwrap();
    assert_eq!(token.as_str(), "facade");
}
