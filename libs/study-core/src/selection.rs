//! Due-item selection.

use crate::error::{CoreError, Result};
use crate::types::VocabularyItem;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// How a batch was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// Drawn at random from the items due at `now`.
    Due,
    /// Nothing was due; the least-reviewed items were taken instead.
    Fallback,
    /// The collection is empty.
    Empty,
}

/// A batch of items to review.
#[derive(Debug, Clone)]
pub struct DueSelection {
    pub items: Vec<VocabularyItem>,
    pub kind: SelectionKind,
}

/// Pick up to `count` items to review from `items` (in creation order).
///
/// Due items are shuffled uniformly and truncated. When nothing is due the
/// `count` items with the smallest review count are returned instead, ties
/// kept in creation order.
pub fn select_due<R: Rng + ?Sized>(
    items: &[VocabularyItem],
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<DueSelection> {
    if count == 0 {
        return Err(CoreError::InvalidArgument(
            "review count must be at least 1".to_string(),
        ));
    }

    if items.is_empty() {
        return Ok(DueSelection {
            items: Vec::new(),
            kind: SelectionKind::Empty,
        });
    }

    let mut due: Vec<VocabularyItem> = items.iter().filter(|i| i.is_due(now)).cloned().collect();

    if !due.is_empty() {
        due.shuffle(rng);
        due.truncate(count);
        return Ok(DueSelection {
            items: due,
            kind: SelectionKind::Due,
        });
    }

    let mut fallback: Vec<&VocabularyItem> = items.iter().collect();
    // Stable sort keeps creation order among equal review counts.
    fallback.sort_by_key(|i| i.progress.review_count);

    Ok(DueSelection {
        items: fallback.into_iter().take(count).cloned().collect(),
        kind: SelectionKind::Fallback,
    })
}
