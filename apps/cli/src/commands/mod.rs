//! Commands exposed to the command-line front end.
//!
//! Each command takes the repository lock for the duration of a single
//! operation and never holds it across user interaction.

pub mod stats;
pub mod study;
pub mod transfer;
pub mod vocab;

pub use stats::{get_review_history, get_statistics};
pub use study::{record_review, select_due, ReviewOutcome};
pub use transfer::{export_snapshot, import_legacy, ExportSummary, LegacyImport};
pub use vocab::{
    add_item, delete_item, get_item, items_by_tag, list_items, search_items, update_item,
    AddResult,
};

use crate::db::DbError;
use serde::Serialize;
use thiserror::Error;

/// Broad category of a command failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Conflict,
    Storage,
}

#[derive(Debug, Error, Serialize)]
#[error("{message}")]
pub struct CommandError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CommandError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(id: i64) -> Self {
        Self::new(ErrorKind::NotFound, format!("no item with id {id}"))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }
}

impl From<DbError> for CommandError {
    fn from(e: DbError) -> Self {
        let kind = match &e {
            DbError::ItemNotFound(_) => ErrorKind::NotFound,
            DbError::DuplicateTerm(_) => ErrorKind::Conflict,
            _ => ErrorKind::Storage,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<study_core::CoreError> for CommandError {
    fn from(e: study_core::CoreError) -> Self {
        Self::new(ErrorKind::InvalidArgument, e.to_string())
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        Self::storage(e.to_string())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(e: serde_json::Error) -> Self {
        Self::storage(e.to_string())
    }
}
