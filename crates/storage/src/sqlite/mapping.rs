use chrono::{DateTime, Utc};
use sqlx::Row;
use track_core::SessionToken;

use crate::repository::{SessionRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn map_session_row(row: &sqlx::sqlite::SqliteRow) -> Result<SessionRecord, StorageError> {
    let token: String = row.try_get("token").map_err(ser)?;
    let saved_at: DateTime<Utc> = row.try_get("saved_at").map_err(ser)?;
    Ok(SessionRecord {
        token: SessionToken::new(token).map_err(ser)?,
        saved_at,
    })
}
