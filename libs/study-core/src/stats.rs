//! Read-side statistics over the item collection and the review history log.

use crate::error::{CoreError, Result};
use crate::types::{ReviewRecord, VocabularyItem};
use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Review counts for one study day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStats {
    pub total: usize,
    pub correct: usize,
}

impl DayStats {
    pub fn accuracy_percent(&self) -> f64 {
        percent(self.correct as u64, self.total as u64)
    }
}

/// Longest range of days a statistics query may cover.
pub const MAX_RANGE_DAYS: i64 = 3660;

/// Inclusive range of study days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(CoreError::InvalidArgument(format!(
                "date range starts after it ends: {start} > {end}"
            )));
        }
        let days = (end - start).num_days() + 1;
        if days > MAX_RANGE_DAYS {
            return Err(CoreError::InvalidArgument(format!(
                "date range covers {days} days, at most {MAX_RANGE_DAYS} are allowed"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Overall study statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyStatistics {
    pub total_words: usize,
    /// Sum of `review_count` over the items that still exist.
    pub total_reviews: u64,
    /// Sum of `correct_count` over the items that still exist.
    pub total_correct: u64,
    pub accuracy_percent: f64,
    /// Length of the history log, including reviews of deleted items.
    pub logged_reviews: usize,
    pub logged_correct: usize,
    pub streak_days: usize,
    pub daily_stats: BTreeMap<NaiveDate, DayStats>,
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

/// Study day a review belongs to.
///
/// Before `daily_reset_hour` (local time in `tz`) the review still counts
/// toward the previous day.
pub fn study_day<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz, daily_reset_hour: u32) -> NaiveDate {
    let local = at.with_timezone(tz);
    let date = local.date_naive();
    if local.hour() < daily_reset_hour {
        date.pred_opt().unwrap_or(date)
    } else {
        date
    }
}

/// Fold the history log into per-day counts.
///
/// Without a range only days with activity appear. With a range every day in
/// it appears, zero-filled, and activity outside it is dropped.
pub fn daily_stats<Tz: TimeZone>(
    history: &[ReviewRecord],
    tz: &Tz,
    daily_reset_hour: u32,
    range: Option<DateRange>,
) -> BTreeMap<NaiveDate, DayStats> {
    let mut days: BTreeMap<NaiveDate, DayStats> = match range {
        Some(range) => range.days().map(|d| (d, DayStats::default())).collect(),
        None => BTreeMap::new(),
    };

    for record in history {
        let day = study_day(record.reviewed_at, tz, daily_reset_hour);
        if range.is_some_and(|r| !r.contains(day)) {
            continue;
        }
        let entry = days.entry(day).or_default();
        entry.total += 1;
        if record.is_correct {
            entry.correct += 1;
        }
    }

    days
}

/// Consecutive study days with at least one review, ending today.
///
/// An empty today does not break the streak; it just isn't counted.
pub fn streak_days(days: &BTreeMap<NaiveDate, DayStats>, today: NaiveDate) -> usize {
    let mut streak = 0usize;
    let mut current = today;

    loop {
        let active = days.get(&current).is_some_and(|d| d.total > 0);
        if active {
            streak += 1;
        } else if !(streak == 0 && current == today) {
            break;
        }
        match current.pred_opt() {
            Some(prev) => current = prev,
            None => break,
        }
    }

    streak
}

/// Newest-first slice of the history log.
pub fn recent_history(history: &[ReviewRecord], limit: usize) -> Vec<ReviewRecord> {
    let mut sorted = history.to_vec();
    // Stable sort keeps append order among identical timestamps.
    sorted.sort_by(|a, b| b.reviewed_at.cmp(&a.reviewed_at));
    sorted.truncate(limit);
    sorted
}

/// Summarize the current items and the full history log.
pub fn summarize<Tz: TimeZone>(
    items: &[VocabularyItem],
    history: &[ReviewRecord],
    tz: &Tz,
    daily_reset_hour: u32,
    now: DateTime<Utc>,
    range: Option<DateRange>,
) -> StudyStatistics {
    let total_reviews: u64 = items.iter().map(|i| u64::from(i.progress.review_count)).sum();
    let total_correct: u64 = items.iter().map(|i| u64::from(i.progress.correct_count)).sum();

    let today = study_day(now, tz, daily_reset_hour);
    let streak = streak_days(&daily_stats(history, tz, daily_reset_hour, None), today);

    StudyStatistics {
        total_words: items.len(),
        total_reviews,
        total_correct,
        accuracy_percent: percent(total_correct, total_reviews),
        logged_reviews: history.len(),
        logged_correct: history.iter().filter(|r| r.is_correct).count(),
        streak_days: streak,
        daily_stats: daily_stats(history, tz, daily_reset_hour, range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReviewProgress;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: i64, is_correct: bool, reviewed_at: DateTime<Utc>) -> ReviewRecord {
        ReviewRecord {
            item_id: id,
            term: format!("term-{id}"),
            is_correct,
            reviewed_at,
        }
    }

    fn item(id: i64, review_count: u32, correct_count: u32) -> VocabularyItem {
        VocabularyItem {
            id,
            term: format!("term-{id}"),
            meaning: "meaning".to_string(),
            example: None,
            tags: BTreeSet::new(),
            created_at: at(2024, 1, 1, 0),
            progress: ReviewProgress {
                review_count,
                correct_count,
                ..Default::default()
            },
        }
    }

    #[test]
    fn accuracy_is_zero_without_reviews() {
        let stats = summarize(&[item(1, 0, 0)], &[], &Utc, 0, at(2024, 3, 1, 12), None);
        assert_eq!(stats.total_words, 1);
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.accuracy_percent, 0.0);
        assert!(stats.daily_stats.is_empty());
    }

    #[test]
    fn totals_come_from_items_and_log_counts_from_history() {
        let items = vec![item(1, 4, 3), item(2, 1, 0)];
        let history = vec![
            record(1, true, at(2024, 3, 1, 9)),
            record(9, false, at(2024, 3, 1, 10)),
            record(2, false, at(2024, 3, 2, 9)),
        ];
        let stats = summarize(&items, &history, &Utc, 0, at(2024, 3, 2, 12), None);
        assert_eq!(stats.total_reviews, 5);
        assert_eq!(stats.total_correct, 3);
        assert_eq!(stats.accuracy_percent, 60.0);
        assert_eq!(stats.logged_reviews, 3);
        assert_eq!(stats.logged_correct, 1);
        assert_eq!(stats.streak_days, 2);
    }

    #[test]
    fn daily_stats_skip_idle_days() {
        let history = vec![
            record(1, true, at(2024, 3, 1, 9)),
            record(1, false, at(2024, 3, 1, 18)),
            record(2, true, at(2024, 3, 4, 9)),
        ];
        let days = daily_stats(&history, &Utc, 0, None);
        assert_eq!(days.len(), 2);
        assert_eq!(days[&date(2024, 3, 1)], DayStats { total: 2, correct: 1 });
        assert_eq!(days[&date(2024, 3, 4)], DayStats { total: 1, correct: 1 });
    }

    #[test]
    fn range_zero_fills_and_clips() {
        let history = vec![
            record(1, true, at(2024, 2, 28, 9)),
            record(1, true, at(2024, 3, 2, 9)),
        ];
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 3)).unwrap();
        let days = daily_stats(&history, &Utc, 0, Some(range));
        let expected: BTreeMap<_, _> = [
            (date(2024, 3, 1), DayStats::default()),
            (date(2024, 3, 2), DayStats { total: 1, correct: 1 }),
            (date(2024, 3, 3), DayStats::default()),
        ]
        .into_iter()
        .collect();
        assert_eq!(days, expected);
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(DateRange::new(date(2024, 3, 3), date(2024, 3, 1)).is_err());
    }

    #[test]
    fn overlong_range_is_rejected() {
        let start = date(2020, 1, 1);
        let longest = start + chrono::Duration::days(MAX_RANGE_DAYS - 1);
        assert!(DateRange::new(start, longest).is_ok());
        assert!(DateRange::new(start, longest + chrono::Duration::days(1)).is_err());
        assert!(DateRange::new(date(1, 1, 1), date(9999, 12, 31)).is_err());
    }

    #[test]
    fn days_follow_local_time() {
        // 23:00 UTC is already the next day at UTC+2.
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let history = vec![record(1, true, at(2024, 3, 1, 23))];
        let days = daily_stats(&history, &tz, 0, None);
        assert!(days.contains_key(&date(2024, 3, 2)));
    }

    #[test]
    fn reset_hour_moves_late_reviews_to_previous_day() {
        assert_eq!(study_day(at(2024, 3, 2, 3), &Utc, 4), date(2024, 3, 1));
        assert_eq!(study_day(at(2024, 3, 2, 4), &Utc, 4), date(2024, 3, 2));
    }

    #[test]
    fn streak_tolerates_empty_today() {
        let history = vec![
            record(1, true, at(2024, 3, 1, 9)),
            record(1, true, at(2024, 3, 2, 9)),
            record(1, true, at(2024, 3, 4, 9)),
            record(1, true, at(2024, 3, 5, 9)),
        ];
        let days = daily_stats(&history, &Utc, 0, None);
        assert_eq!(streak_days(&days, date(2024, 3, 5)), 2);
        assert_eq!(streak_days(&days, date(2024, 3, 6)), 2);
        assert_eq!(streak_days(&days, date(2024, 3, 7)), 0);
        assert_eq!(streak_days(&days, date(2024, 3, 2)), 2);
    }

    #[test]
    fn recent_history_is_newest_first() {
        let history = vec![
            record(1, true, at(2024, 3, 2, 9)),
            record(2, true, at(2024, 3, 1, 9)),
            record(3, false, at(2024, 3, 3, 9)),
        ];
        let recent = recent_history(&history, 2);
        let ids: Vec<_> = recent.iter().map(|r| r.item_id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
