//! Local SQLite store for vocabulary items and the review history log.

pub mod error;
pub mod repository;
pub mod schema;

pub use error::DbError;
pub use repository::{
    HistoryRepository, ImportSummary, ImportedItem, ItemRepository, OpenedRepository,
    SqliteRepository,
};
