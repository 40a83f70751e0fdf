//! Statistics commands.

use super::CommandError;
use crate::db::{HistoryRepository, ItemRepository};
use crate::state::AppState;
use chrono::Local;
use study_core::stats::recent_history;
use study_core::{summarize, DateRange, ReviewRecord, StudyStatistics};

/// Overall statistics, with per-day counts optionally fixed to `range`.
pub fn get_statistics(state: &AppState, range: Option<DateRange>) -> Result<StudyStatistics, CommandError> {
    let (items, history) = {
        let repo = state.repository()?;
        (repo.all_items()?, repo.history()?)
    };

    Ok(summarize(
        &items,
        &history,
        &Local,
        state.settings.daily_reset_hour,
        state.now(),
        range,
    ))
}

/// Most recent reviews first; `limit` defaults to the configured history limit.
pub fn get_review_history(state: &AppState, limit: Option<usize>) -> Result<Vec<ReviewRecord>, CommandError> {
    let history = {
        let repo = state.repository()?;
        repo.history()?
    };
    Ok(recent_history(&history, limit.unwrap_or(state.settings.history_limit)))
}
