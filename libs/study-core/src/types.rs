//! Core types for the vocabulary trainer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of a vocabulary item. Assigned by the store, never reused.
pub type ItemId = i64;

/// Normalize a term into its case-insensitive identity key.
pub fn term_key(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Review statistics and schedule of a single item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewProgress {
    pub review_count: u32,
    pub correct_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// `None` means the item is due immediately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review_at: Option<DateTime<Utc>>,
}

impl ReviewProgress {
    /// Whether the item is due for review at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review_at {
            None => true,
            Some(next) => next <= now,
        }
    }
}

/// A memorized item with its review statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub id: ItemId,
    pub term: String,
    pub meaning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub progress: ReviewProgress,
}

impl VocabularyItem {
    pub fn term_key(&self) -> String {
        term_key(&self.term)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.progress.is_due(now)
    }

    /// Case-insensitive substring match over term, meaning, example and tags.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.term.to_lowercase().contains(&query)
            || self.meaning.to_lowercase().contains(&query)
            || self
                .example
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(&query))
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}

/// Fields supplied when adding an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub term: String,
    pub meaning: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl NewItem {
    pub fn new(term: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            meaning: meaning.into(),
            example: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update of an item. Omitted fields keep their prior values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.term.is_none() && self.meaning.is_none() && self.example.is_none() && self.tags.is_none()
    }

    /// Overwrite the supplied fields of `item`.
    pub fn apply(&self, item: &mut VocabularyItem) {
        if let Some(term) = &self.term {
            item.term = term.trim().to_string();
        }
        if let Some(meaning) = &self.meaning {
            item.meaning = meaning.clone();
        }
        if let Some(example) = &self.example {
            item.example = Some(example.clone()).filter(|e| !e.is_empty());
        }
        if let Some(tags) = &self.tags {
            item.tags = tags.clone();
        }
    }
}

/// Append-only history entry for one review outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Back-reference for lookup only; the item may since have been deleted.
    pub item_id: ItemId,
    /// Term as it read at review time.
    pub term: String,
    pub is_correct: bool,
    pub reviewed_at: DateTime<Utc>,
}

/// Matching mode for typed quiz answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMode {
    /// Answer is a non-empty substring of the meaning.
    Substring,
    /// Answer equals the meaning, ignoring case and repeated whitespace.
    Exact,
}

impl Default for MatchingMode {
    fn default() -> Self {
        Self::Substring
    }
}

impl MatchingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substring => "substring",
            Self::Exact => "exact",
        }
    }
}

/// Outcome of one quiz session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub total_asked: usize,
    pub correct: usize,
}

impl SessionResult {
    pub fn record(&mut self, is_correct: bool) {
        self.total_asked += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    /// Fraction of correct answers, undefined for an empty session.
    pub fn accuracy(&self) -> Option<f64> {
        if self.total_asked == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total_asked as f64)
        }
    }
}

/// User settings, read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_quiz_size: usize,
    pub interval_step_days: u32,
    pub max_interval_days: u32,
    pub matching_mode: MatchingMode,
    /// Hour of day (0-23) when a new study day begins.
    pub daily_reset_hour: u32,
    pub history_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_quiz_size: 5,
            interval_step_days: 2,
            max_interval_days: 30,
            matching_mode: MatchingMode::default(),
            daily_reset_hour: 0,
            history_limit: 50,
        }
    }
}
