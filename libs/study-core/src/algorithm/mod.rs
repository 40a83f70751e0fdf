//! Review scheduling policies.

pub mod linear;

pub use linear::LinearInterval;

use crate::types::ReviewProgress;
use chrono::{DateTime, Utc};

/// Result of scheduling an item after a review.
#[derive(Debug, Clone)]
pub struct SchedulingResult {
    pub new_progress: ReviewProgress,
    pub interval_days: u32,
    pub next_due: DateTime<Utc>,
}

/// Trait for review scheduling policies.
pub trait ReviewPolicy: Send + Sync {
    /// Policy identifier.
    fn name(&self) -> &'static str;

    /// Calculate the next review state after a review outcome.
    fn schedule(&self, progress: &ReviewProgress, is_correct: bool, now: DateTime<Utc>) -> SchedulingResult;
}
