//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("item not found: {0}")]
    ItemNotFound(i64),

    #[error("term already exists: {0}")]
    DuplicateTerm(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("corrupt store: {0}")]
    Corrupt(String),
}

impl DbError {
    /// Whether the on-disk store is unreadable and should be replaced.
    pub fn is_corruption(&self) -> bool {
        match self {
            Self::Corrupt(_) => true,
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::NotADatabase | rusqlite::ErrorCode::DatabaseCorrupt
            ),
            _ => false,
        }
    }
}
