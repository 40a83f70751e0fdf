//! Snapshot export and import of legacy JSON word lists.
//!
//! The legacy layout is a directory holding `words.json` and `history.json`,
//! with local timestamps written as `%Y-%m-%d %H:%M:%S`.

use super::CommandError;
use crate::db::{HistoryRepository, ImportSummary, ImportedItem, ItemRepository};
use crate::state::AppState;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use study_core::{NewItem, ReviewProgress, ReviewRecord, VocabularyItem};
use tracing::{info, warn};

const LEGACY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
struct Snapshot<'a> {
    exported_at: DateTime<Utc>,
    words: &'a [VocabularyItem],
    history: &'a [ReviewRecord],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub items: usize,
    pub reviews: usize,
}

/// Outcome of a legacy import, with anything that had to be skipped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LegacyImport {
    pub summary: ImportSummary,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyWord {
    word: String,
    meaning: String,
    #[serde(default)]
    example: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    review_count: u32,
    #[serde(default)]
    correct_count: u32,
    #[serde(default)]
    last_reviewed: Option<String>,
    #[serde(default)]
    next_review: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyReview {
    word: String,
    is_correct: bool,
    reviewed_at: String,
}

/// Write all items and the full history to `path` as pretty JSON.
///
/// The file is written to a temporary sibling and renamed into place, so an
/// interrupted export never leaves a truncated file at `path`.
pub fn export_snapshot(state: &AppState, path: &Path) -> Result<ExportSummary, CommandError> {
    let (words, history) = {
        let repo = state.repository()?;
        (repo.all_items()?, repo.history()?)
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        serde_json::to_writer_pretty(
            &mut writer,
            &Snapshot {
                exported_at: state.now(),
                words: &words,
                history: &history,
            },
        )?;
        writer.flush()?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    info!(path = %path.display(), items = words.len(), reviews = history.len(), "exported snapshot");
    Ok(ExportSummary {
        items: words.len(),
        reviews: history.len(),
    })
}

/// Import a legacy `words.json` / `history.json` pair from `dir`.
///
/// A missing file counts as empty. A file that cannot be parsed is reported
/// and treated as empty rather than failing the import. Reviews older than
/// the newest stored review are reported and skipped.
pub fn import_legacy(state: &AppState, dir: &Path) -> Result<LegacyImport, CommandError> {
    let mut warnings = Vec::new();
    let words: Vec<LegacyWord> = read_legacy_file(&dir.join("words.json"), &mut warnings)?;
    let reviews: Vec<LegacyReview> = read_legacy_file(&dir.join("history.json"), &mut warnings)?;
    let now = state.now();

    let items: Vec<ImportedItem> = words
        .into_iter()
        .filter(|w| !w.word.trim().is_empty())
        .map(|w| {
            let review_count = w.review_count;
            ImportedItem {
                item: NewItem {
                    term: w.word,
                    meaning: w.meaning,
                    example: w.example.filter(|e| !e.is_empty()),
                    tags: w.tags.into_iter().filter(|t| !t.trim().is_empty()).collect(),
                },
                created_at: w.created_at.as_deref().and_then(parse_legacy_time).unwrap_or(now),
                progress: ReviewProgress {
                    review_count,
                    correct_count: w.correct_count.min(review_count),
                    last_reviewed_at: w.last_reviewed.as_deref().and_then(parse_legacy_time),
                    next_review_at: w.next_review.as_deref().and_then(parse_legacy_time),
                },
            }
        })
        .collect();

    let mut history = Vec::with_capacity(reviews.len());
    for review in reviews {
        match parse_legacy_time(&review.reviewed_at) {
            Some(reviewed_at) => history.push(ReviewRecord {
                item_id: 0,
                term: review.word,
                is_correct: review.is_correct,
                reviewed_at,
            }),
            None => warnings.push(format!(
                "skipped review of {:?} with unreadable time {:?}",
                review.word, review.reviewed_at
            )),
        }
    }
    history.sort_by_key(|r| r.reviewed_at);

    let summary = {
        let repo = state.repository()?;
        // The log only grows forward in time.
        if let Some(latest) = repo.latest_review_at()? {
            history.retain(|r| {
                if r.reviewed_at < latest {
                    warnings.push(format!(
                        "skipped review of {:?} at {} predating existing history",
                        r.term, r.reviewed_at
                    ));
                    false
                } else {
                    true
                }
            });
        }
        repo.import(&items, &history)?
    };

    info!(
        dir = %dir.display(),
        added = summary.items_added,
        skipped = summary.items_skipped,
        reviews = summary.reviews_added,
        "imported legacy data"
    );
    Ok(LegacyImport { summary, warnings })
}

fn read_legacy_file<T: DeserializeOwned>(path: &Path, warnings: &mut Vec<String>) -> Result<Vec<T>, CommandError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_str(&content) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "legacy file is corrupt, treating it as empty");
            warnings.push(format!("{} is corrupt and was ignored: {e}", path.display()));
            Ok(Vec::new())
        }
    }
}

/// Parse a legacy local timestamp, also accepting RFC 3339.
fn parse_legacy_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s.trim(), LEGACY_TIME_FORMAT) {
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|t| t.with_timezone(&Utc));
    }
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
