//! Core vocabulary review library shared by the study assistant front ends.
//!
//! Provides:
//! - Vocabulary item and review history types
//! - The linear forgetting-curve interval policy
//! - Due-item selection with the least-reviewed fallback
//! - Answer judging for typed quiz answers
//! - Statistics derived from items and the review history log

pub mod algorithm;
pub mod error;
pub mod matching;
pub mod selection;
pub mod stats;
pub mod types;

pub use algorithm::{LinearInterval, ReviewPolicy, SchedulingResult};
pub use error::{CoreError, Result};
pub use matching::{judge_answer, MatchResult};
pub use selection::{select_due, DueSelection, SelectionKind};
pub use stats::{summarize, DateRange, DayStats, StudyStatistics};
pub use types::{
    ItemId, ItemPatch, MatchingMode, NewItem, ReviewProgress, ReviewRecord, SessionResult,
    Settings, VocabularyItem,
};
