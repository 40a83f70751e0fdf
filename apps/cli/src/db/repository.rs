//! Repository pattern for database access.

use crate::db::error::DbError;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use study_core::types::term_key;
use study_core::{ItemId, ItemPatch, NewItem, ReviewProgress, ReviewRecord, VocabularyItem};
use tracing::{debug, warn};

type Result<T> = std::result::Result<T, DbError>;

/// Repository for vocabulary item operations.
pub trait ItemRepository {
    /// Add an item, or return the existing one with the same term.
    fn add_item(&self, item: &NewItem, now: DateTime<Utc>) -> Result<VocabularyItem>;
    fn get_item(&self, id: ItemId) -> Result<Option<VocabularyItem>>;
    fn find_by_term(&self, term: &str) -> Result<Option<VocabularyItem>>;
    fn update_item(&self, id: ItemId, patch: &ItemPatch) -> Result<Option<VocabularyItem>>;
    fn delete_item(&self, id: ItemId) -> Result<bool>;
    /// All readable items in creation order.
    fn all_items(&self) -> Result<Vec<VocabularyItem>>;
    fn item_count(&self) -> Result<usize>;
}

/// Repository for the review history log.
pub trait HistoryRepository {
    /// Full log in append order, leaving out unreadable records.
    fn history(&self) -> Result<Vec<ReviewRecord>>;
    fn history_len(&self) -> Result<usize>;
    /// Timestamp of the newest history record.
    fn latest_review_at(&self) -> Result<Option<DateTime<Utc>>>;
    /// Store an item's new progress and append its history record atomically.
    fn apply_review(&self, item: &VocabularyItem, record: &ReviewRecord) -> Result<()>;
}

/// Item carried over from another store, with its statistics.
#[derive(Debug, Clone)]
pub struct ImportedItem {
    pub item: NewItem,
    pub created_at: DateTime<Utc>,
    pub progress: ReviewProgress,
}

/// Counts from a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportSummary {
    pub items_added: usize,
    pub items_skipped: usize,
    pub reviews_added: usize,
}

/// A repository together with the recovery that opening it required.
pub struct OpenedRepository {
    pub repository: SqliteRepository,
    /// Where an unreadable store was moved before starting fresh.
    pub recovered_from: Option<PathBuf>,
}

/// SQLite implementation of repositories.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open database at path, replacing it with an empty one if unreadable.
    ///
    /// The unreadable file is kept next to the original as
    /// `<name>.corrupt-<timestamp>`.
    pub fn open_or_recover<P: AsRef<Path>>(path: P) -> Result<OpenedRepository> {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(repository) => Ok(OpenedRepository {
                repository,
                recovered_from: None,
            }),
            Err(err) if err.is_corruption() => {
                let backup = quarantine_path(path);
                warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    error = %err,
                    "store is unreadable, starting from an empty one"
                );
                fs::rename(path, &backup)?;
                let repository = Self::open(path)?;
                Ok(OpenedRepository {
                    repository,
                    recovered_from: Some(backup),
                })
            }
            Err(err) => Err(err),
        }
    }

    fn initialize(&self) -> Result<()> {
        let status: String = self
            .conn
            .query_row("PRAGMA quick_check", [], |row| row.get(0))?;
        if status != "ok" {
            return Err(DbError::Corrupt(status));
        }

        self.conn.execute_batch(super::schema::SCHEMA)?;
        self.conn.execute_batch(super::schema::INIT_SCHEMA_VERSION)?;

        let version: i32 = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
        if version > super::schema::SCHEMA_VERSION {
            return Err(DbError::InvalidData(format!(
                "store was written by a newer schema (version {version})"
            )));
        }
        Ok(())
    }

    /// Bulk insert items and history in one transaction.
    ///
    /// Items whose term already exists are skipped. History records are
    /// re-pointed at the item carrying their term; records whose term is
    /// unknown keep item id 0.
    pub fn import(&self, items: &[ImportedItem], history: &[ReviewRecord]) -> Result<ImportSummary> {
        let tx = self.conn.unchecked_transaction()?;
        let mut summary = ImportSummary::default();

        for imported in items {
            if self.find_by_term(&imported.item.term)?.is_some() {
                summary.items_skipped += 1;
                continue;
            }
            self.insert_item(&imported.item, imported.created_at, &imported.progress)?;
            summary.items_added += 1;
        }

        for record in history {
            let item_id = self.find_by_term(&record.term)?.map(|i| i.id).unwrap_or(0);
            self.insert_record(&ReviewRecord {
                item_id,
                ..record.clone()
            })?;
            summary.reviews_added += 1;
        }

        tx.commit()?;
        Ok(summary)
    }

    fn insert_item(&self, item: &NewItem, created_at: DateTime<Utc>, progress: &ReviewProgress) -> Result<ItemId> {
        let term = item.term.trim();
        let example = item.example.as_deref().filter(|e| !e.is_empty());
        self.conn.execute(
            "INSERT INTO vocabulary_items (term, term_key, meaning, example, tags, created_at, review_count, correct_count, last_reviewed_at, next_review_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                term,
                term_key(term),
                item.meaning,
                example,
                serde_json::to_string(&item.tags)?,
                to_db_time(&created_at),
                progress.review_count,
                progress.correct_count,
                progress.last_reviewed_at.as_ref().map(to_db_time),
                progress.next_review_at.as_ref().map(to_db_time),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_record(&self, record: &ReviewRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO review_history (item_id, term, is_correct, reviewed_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.item_id,
                record.term,
                record.is_correct,
                to_db_time(&record.reviewed_at),
            ],
        )?;
        Ok(())
    }

    fn query_items(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<VocabularyItem>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, ItemRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // An unreadable row is left out rather than hiding every other item.
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match row.into_item() {
                    Ok(item) => Some(item),
                    Err(e) => {
                        warn!(id, error = %e, "skipping unreadable item");
                        None
                    }
                }
            })
            .collect())
    }
}

const ITEM_COLUMNS: &str = "id, term, meaning, example, tags, created_at, review_count, correct_count, last_reviewed_at, next_review_at";

impl ItemRepository for SqliteRepository {
    fn add_item(&self, item: &NewItem, now: DateTime<Utc>) -> Result<VocabularyItem> {
        if let Some(existing) = self.find_by_term(&item.term)? {
            debug!(id = existing.id, term = %existing.term, "term already stored");
            return Ok(existing);
        }

        let id = self.insert_item(item, now, &ReviewProgress::default())?;
        self.get_item(id)?
            .ok_or_else(|| DbError::InvalidData(format!("item {id} vanished after insert")))
    }

    fn get_item(&self, id: ItemId) -> Result<Option<VocabularyItem>> {
        self.conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM vocabulary_items WHERE id = ?1"),
                params![id],
                ItemRow::from_row,
            )
            .optional()?
            .map(ItemRow::into_item)
            .transpose()
    }

    fn find_by_term(&self, term: &str) -> Result<Option<VocabularyItem>> {
        self.conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM vocabulary_items WHERE term_key = ?1"),
                params![term_key(term)],
                ItemRow::from_row,
            )
            .optional()?
            .map(ItemRow::into_item)
            .transpose()
    }

    fn update_item(&self, id: ItemId, patch: &ItemPatch) -> Result<Option<VocabularyItem>> {
        let Some(mut item) = self.get_item(id)? else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(item));
        }

        if let Some(term) = &patch.term {
            if let Some(other) = self.find_by_term(term)? {
                if other.id != id {
                    return Err(DbError::DuplicateTerm(other.term));
                }
            }
        }

        patch.apply(&mut item);
        self.conn.execute(
            "UPDATE vocabulary_items SET term = ?1, term_key = ?2, meaning = ?3, example = ?4, tags = ?5 WHERE id = ?6",
            params![
                item.term,
                item.term_key(),
                item.meaning,
                item.example,
                serde_json::to_string(&item.tags)?,
                id,
            ],
        )?;
        Ok(Some(item))
    }

    fn delete_item(&self, id: ItemId) -> Result<bool> {
        let count = self
            .conn
            .execute("DELETE FROM vocabulary_items WHERE id = ?1", params![id])?;
        Ok(count > 0)
    }

    fn all_items(&self) -> Result<Vec<VocabularyItem>> {
        self.query_items(
            &format!("SELECT {ITEM_COLUMNS} FROM vocabulary_items ORDER BY id"),
            [],
        )
    }

    fn item_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM vocabulary_items", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl HistoryRepository for SqliteRepository {
    fn history(&self) -> Result<Vec<ReviewRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT item_id, term, is_correct, reviewed_at FROM review_history ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(item_id, term, is_correct, reviewed_at)| match from_db_time(&reviewed_at) {
                Ok(reviewed_at) => Some(ReviewRecord {
                    item_id,
                    term,
                    is_correct,
                    reviewed_at,
                }),
                Err(e) => {
                    warn!(item_id, error = %e, "skipping unreadable history record");
                    None
                }
            })
            .collect())
    }

    fn history_len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM review_history", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn latest_review_at(&self) -> Result<Option<DateTime<Utc>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT reviewed_at FROM review_history ORDER BY reviewed_at DESC")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let reviewed_at: String = row.get(0)?;
            if let Ok(at) = from_db_time(&reviewed_at) {
                return Ok(Some(at));
            }
        }
        Ok(None)
    }

    fn apply_review(&self, item: &VocabularyItem, record: &ReviewRecord) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let progress = &item.progress;
        let updated = self.conn.execute(
            "UPDATE vocabulary_items SET review_count = ?1, correct_count = ?2, last_reviewed_at = ?3, next_review_at = ?4 WHERE id = ?5",
            params![
                progress.review_count,
                progress.correct_count,
                progress.last_reviewed_at.as_ref().map(to_db_time),
                progress.next_review_at.as_ref().map(to_db_time),
                item.id,
            ],
        )?;
        if updated == 0 {
            return Err(DbError::ItemNotFound(item.id));
        }
        self.insert_record(record)?;
        tx.commit()?;
        Ok(())
    }
}

/// Raw item columns before timestamp and tag parsing.
struct ItemRow {
    id: i64,
    term: String,
    meaning: String,
    example: Option<String>,
    tags: String,
    created_at: String,
    review_count: u32,
    correct_count: u32,
    last_reviewed_at: Option<String>,
    next_review_at: Option<String>,
}

impl ItemRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            term: row.get(1)?,
            meaning: row.get(2)?,
            example: row.get(3)?,
            tags: row.get(4)?,
            created_at: row.get(5)?,
            review_count: row.get(6)?,
            correct_count: row.get(7)?,
            last_reviewed_at: row.get(8)?,
            next_review_at: row.get(9)?,
        })
    }

    fn into_item(self) -> Result<VocabularyItem> {
        let row = self;
        let tags: BTreeSet<String> = serde_json::from_str(&row.tags)
            .map_err(|e| DbError::InvalidData(format!("tags of item {}: {e}", row.id)))?;

        Ok(VocabularyItem {
            id: row.id,
            term: row.term,
            meaning: row.meaning,
            example: row.example,
            tags,
            created_at: from_db_time(&row.created_at)?,
            progress: ReviewProgress {
                review_count: row.review_count,
                correct_count: row.correct_count,
                last_reviewed_at: row.last_reviewed_at.as_deref().map(from_db_time).transpose()?,
                next_review_at: row.next_review_at.as_deref().map(from_db_time).transpose()?,
            },
        })
    }
}

fn to_db_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn from_db_time(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::InvalidData(format!("timestamp {s:?}: {e}")))
}

fn quarantine_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());
    path.with_file_name(format!("{name}.corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S")))
}
