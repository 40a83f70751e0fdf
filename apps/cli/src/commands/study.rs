//! Review scheduling commands.

use super::CommandError;
use crate::db::{HistoryRepository, ItemRepository};
use crate::state::AppState;
use study_core::{DueSelection, ItemId, ReviewPolicy, ReviewRecord, VocabularyItem};
use tracing::{debug, info};

/// Item state and history entry produced by one review.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReviewOutcome {
    pub item: VocabularyItem,
    pub record: ReviewRecord,
    pub interval_days: u32,
}

/// Pick up to `count` items to review.
pub fn select_due(state: &AppState, count: usize) -> Result<DueSelection, CommandError> {
    if count == 0 {
        return Err(CommandError::invalid_argument("review count must be at least 1"));
    }

    let items = {
        let repo = state.repository()?;
        repo.all_items()?
    };

    let selection = study_core::select_due(&items, count, state.now(), &mut rand::rng())?;
    debug!(kind = ?selection.kind, selected = selection.items.len(), total = items.len(), "selected review batch");
    Ok(selection)
}

/// Record a review outcome and reschedule the item.
///
/// Unknown ids are ignored: `Ok(None)` is returned and nothing is written.
pub fn record_review(
    state: &AppState,
    item_id: ItemId,
    is_correct: bool,
) -> Result<Option<ReviewOutcome>, CommandError> {
    let repo = state.repository()?;
    let Some(item) = repo.get_item(item_id)? else {
        debug!(item_id, "ignoring review of unknown item");
        return Ok(None);
    };

    // Keep the history log in non-decreasing time order even if the clock
    // stepped backwards.
    let clock_now = state.now();
    let now = match repo.latest_review_at()? {
        Some(latest) if latest > clock_now => latest,
        _ => clock_now,
    };

    let result = state.policy().schedule(&item.progress, is_correct, now);
    let item = VocabularyItem {
        progress: result.new_progress,
        ..item
    };
    let record = ReviewRecord {
        item_id,
        term: item.term.clone(),
        is_correct,
        reviewed_at: now,
    };

    repo.apply_review(&item, &record)?;
    info!(
        item_id,
        is_correct,
        interval_days = result.interval_days,
        next_review_at = %result.next_due,
        "recorded review"
    );

    Ok(Some(ReviewOutcome {
        item,
        record,
        interval_days: result.interval_days,
    }))
}
