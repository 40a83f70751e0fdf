//! Answer judging for typed quiz answers.

use crate::types::MatchingMode;
use serde::{Deserialize, Serialize};

/// Result of judging a typed answer against the stored meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    /// The matching mode used.
    pub matching_mode: MatchingMode,
    /// Normalized typed answer (for display).
    pub typed_normalized: String,
}

/// Judge a typed answer against the expected meaning.
///
/// In substring mode the trimmed answer is correct iff it is non-empty and
/// occurs, ignoring case, anywhere in the meaning. This accepts partial
/// answers, and also trivially short ones such as a single shared letter.
pub fn judge_answer(typed: &str, meaning: &str, mode: MatchingMode) -> MatchResult {
    let typed_normalized = normalize_whitespace(typed);

    let is_correct = match mode {
        MatchingMode::Substring => {
            let needle = typed.trim().to_lowercase();
            !needle.is_empty() && meaning.to_lowercase().contains(&needle)
        }
        MatchingMode::Exact => {
            !typed_normalized.is_empty()
                && normalize_whitespace(meaning).to_lowercase() == typed_normalized.to_lowercase()
        }
    };

    MatchResult {
        is_correct,
        matching_mode: mode,
        typed_normalized,
    }
}

/// Normalize whitespace in a string (trim and collapse multiple spaces).
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
