//! Linear forgetting-curve policy.
//!
//! A correct answer pushes the next review out by `step_days` per
//! cumulative review, capped at `max_days`. A wrong answer collapses the
//! interval to one day regardless of history. There is no ease factor and
//! no per-item difficulty.

use super::{ReviewPolicy, SchedulingResult};
use crate::types::{ReviewProgress, Settings};
use chrono::{DateTime, Duration, Utc};

/// Linear interval policy with configurable step and cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearInterval {
    pub step_days: u32,
    pub max_days: u32,
}

impl Default for LinearInterval {
    fn default() -> Self {
        Self {
            step_days: 2,
            max_days: 30,
        }
    }
}

impl LinearInterval {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            step_days: settings.interval_step_days,
            max_days: settings.max_interval_days,
        }
    }

    /// Interval in whole days given the review count *after* this review.
    pub fn interval_days(&self, review_count: u32, is_correct: bool) -> u32 {
        if is_correct {
            review_count.saturating_mul(self.step_days).min(self.max_days)
        } else {
            1
        }
    }
}

impl ReviewPolicy for LinearInterval {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn schedule(&self, progress: &ReviewProgress, is_correct: bool, now: DateTime<Utc>) -> SchedulingResult {
        let review_count = progress.review_count.saturating_add(1);
        let correct_count = if is_correct {
            progress.correct_count.saturating_add(1)
        } else {
            progress.correct_count
        };

        let interval_days = self.interval_days(review_count, is_correct);
        let next_due = now + Duration::days(i64::from(interval_days));

        SchedulingResult {
            new_progress: ReviewProgress {
                review_count,
                correct_count,
                last_reviewed_at: Some(now),
                next_review_at: Some(next_due),
            },
            interval_days,
            next_due,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 20, 30, 0).unwrap()
    }

    #[test]
    fn first_correct_review_waits_two_days() {
        let policy = LinearInterval::default();
        let result = policy.schedule(&ReviewProgress::default(), true, now());
        assert_eq!(result.new_progress.review_count, 1);
        assert_eq!(result.new_progress.correct_count, 1);
        assert_eq!(result.interval_days, 2);
        assert_eq!(result.next_due, now() + Duration::days(2));
        assert_eq!(result.new_progress.last_reviewed_at, Some(now()));
    }

    #[test]
    fn wrong_answer_resets_to_one_day() {
        let policy = LinearInterval::default();
        let progress = ReviewProgress {
            review_count: 1,
            correct_count: 1,
            ..Default::default()
        };
        let result = policy.schedule(&progress, false, now());
        assert_eq!(result.new_progress.review_count, 2);
        assert_eq!(result.new_progress.correct_count, 1);
        assert_eq!(result.interval_days, 1);
        assert_eq!(result.next_due, now() + Duration::days(1));
    }

    #[test]
    fn interval_counts_wrong_reviews_too() {
        // Growth follows the cumulative review count, not the correct count.
        let policy = LinearInterval::default();
        let progress = ReviewProgress {
            review_count: 4,
            correct_count: 1,
            ..Default::default()
        };
        let result = policy.schedule(&progress, true, now());
        assert_eq!(result.interval_days, 10);
    }

    #[test]
    fn interval_is_capped() {
        let policy = LinearInterval::default();
        assert_eq!(policy.interval_days(15, true), 30);
        assert_eq!(policy.interval_days(16, true), 30);
        assert_eq!(policy.interval_days(u32::MAX, true), 30);
        assert_eq!(policy.interval_days(u32::MAX, false), 1);
    }

    #[test]
    fn counts_stay_consistent_over_many_reviews() {
        let policy = LinearInterval::default();
        let mut progress = ReviewProgress::default();
        for i in 0..40u32 {
            let before = progress.clone();
            progress = policy.schedule(&progress, i % 3 != 0, now()).new_progress;
            assert!(progress.correct_count <= progress.review_count);
            assert!(progress.review_count > before.review_count);
            assert!(progress.correct_count >= before.correct_count);
        }
    }

    #[test]
    fn settings_configure_step_and_cap() {
        let settings = Settings {
            interval_step_days: 3,
            max_interval_days: 10,
            ..Default::default()
        };
        let policy = LinearInterval::from_settings(&settings);
        assert_eq!(policy.interval_days(2, true), 6);
        assert_eq!(policy.interval_days(5, true), 10);
    }
}
