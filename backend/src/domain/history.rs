//! Bounded, day-keyed history lists and the views derived from them.
//!
//! Nothing in here fails: missing histories are empty vectors, unknown mood
//! labels chart as the neutral value.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use shared::{ChartPoint, ChatMessage, ChatRole, Mood, MoodEntry};

use super::date_engine::format_date;

/// Entries kept in the mood history
pub const MOOD_HISTORY_WINDOW: usize = 14;

/// Days shown on the profile mood curve
pub const MOOD_CHART_DAYS: usize = 7;

/// Value charted for days without an entry (平靜)
pub const NEUTRAL_CHART_VALUE: i32 = 3;

/// Window used by the "recent queries" list
pub const RECENT_QUERY_DAYS: i64 = 7;

/// Records that are bucketed per calendar day
pub trait DayKeyed {
    fn day_key(&self) -> &str;
}

impl DayKeyed for MoodEntry {
    fn day_key(&self) -> &str {
        &self.date
    }
}

/// Replace any entry for the same day, append, keep the newest `window_size`
pub fn upsert_daily_entry<E: DayKeyed>(history: Vec<E>, new_entry: E, window_size: usize) -> Vec<E> {
    let mut updated: Vec<E> = history
        .into_iter()
        .filter(|entry| entry.day_key() != new_entry.day_key())
        .collect();
    updated.push(new_entry);

    if updated.len() > window_size {
        updated.drain(..updated.len() - window_size);
    }
    updated
}

/// Unconditional append
pub fn append_entry<E>(history: Vec<E>, new_entry: E) -> Vec<E> {
    append_entry_capped(history, new_entry, None)
}

/// Append, then keep only the newest `cap` entries when a cap is configured
pub fn append_entry_capped<E>(mut history: Vec<E>, new_entry: E, cap: Option<usize>) -> Vec<E> {
    history.push(new_entry);
    if let Some(cap) = cap {
        if history.len() > cap {
            history.drain(..history.len() - cap);
        }
    }
    history
}

/// Messages from `role` sent within the last `window_days`, newest first.
///
/// The iterator borrows `history`; call again for a fresh pass.
pub fn recent_by_role<'a>(
    history: &'a [ChatMessage],
    role: ChatRole,
    window_days: i64,
    now: DateTime<Utc>,
) -> impl Iterator<Item = &'a ChatMessage> + 'a {
    let cutoff = now - Duration::days(window_days.max(0));
    history
        .iter()
        .rev()
        .filter(move |message| message.role == role && message.timestamp >= cutoff)
}

/// The last `count` entries, newest first
pub fn latest_entries<E: Clone>(history: &[E], count: usize) -> Vec<E> {
    history.iter().rev().take(count).cloned().collect()
}

/// Chart value for a stored label; unknown labels read as `default_value`
pub fn mood_value(label: &str, default_value: i32) -> i32 {
    Mood::from_label(label)
        .map(|mood| mood.chart_value())
        .unwrap_or(default_value)
}

/// Day keys for the `days` calendar days ending on `today`, oldest first
pub fn trailing_day_keys(today: NaiveDate, days: usize) -> Vec<String> {
    (0..days)
        .rev()
        .filter_map(|offset| today.checked_sub_days(chrono::Days::new(offset as u64)))
        .map(format_date)
        .collect()
}

/// One point per day for the last `days` days ending on `today`, oldest first
pub fn series_for_chart(
    history: &[MoodEntry],
    days: usize,
    today: NaiveDate,
    default_value: i32,
) -> Vec<ChartPoint> {
    trailing_day_keys(today, days)
        .into_iter()
        .map(|day_key| {
            let value = history
                .iter()
                .find(|entry| entry.date == day_key)
                .map(|entry| mood_value(&entry.mood, default_value))
                .unwrap_or(default_value);
            ChartPoint { day_key, value }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(date: &str, mood: Mood) -> MoodEntry {
        MoodEntry::new(date, mood)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_upsert_replaces_same_day() {
        let history = vec![entry("2024-03-01", Mood::Happy)];
        let updated = upsert_daily_entry(history, entry("2024-03-01", Mood::Anxious), MOOD_HISTORY_WINDOW);

        assert_eq!(updated, vec![entry("2024-03-01", Mood::Anxious)]);
    }

    #[test]
    fn test_upsert_moves_replaced_day_to_end() {
        let history = vec![
            entry("2024-03-01", Mood::Happy),
            entry("2024-03-02", Mood::Calm),
        ];
        let updated = upsert_daily_entry(history, entry("2024-03-01", Mood::Tired), MOOD_HISTORY_WINDOW);

        let keys: Vec<&str> = updated.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(keys, vec!["2024-03-02", "2024-03-01"]);
    }

    #[test]
    fn test_upsert_evicts_oldest_beyond_window() {
        let mut history = Vec::new();
        for d in 1..=15 {
            history = upsert_daily_entry(history, entry(&format!("2024-03-{:02}", d), Mood::Calm), 14);
            assert!(history.len() <= 14);
        }

        assert_eq!(history.len(), 14);
        assert_eq!(history.first().unwrap().date, "2024-03-02");
        assert_eq!(history.last().unwrap().date, "2024-03-15");
    }

    #[test]
    fn test_upsert_with_zero_window_keeps_nothing() {
        let updated = upsert_daily_entry(Vec::new(), entry("2024-03-01", Mood::Calm), 0);
        assert!(updated.is_empty());
    }

    #[test]
    fn test_append_has_no_dedup_or_cap() {
        let mut history = Vec::new();
        for i in 0..100 {
            history = append_entry(history, i);
        }
        assert_eq!(history.len(), 100);

        let capped = append_entry_capped(vec![1, 2, 3], 4, Some(3));
        assert_eq!(capped, vec![2, 3, 4]);
    }

    #[test]
    fn test_recent_by_role_filters_and_orders() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let history = vec![
            ChatMessage::user("too old", now - Duration::days(8)),
            ChatMessage::user("first", now - Duration::days(6)),
            ChatMessage::assistant("reply", now - Duration::days(6)),
            ChatMessage::user("second", now - Duration::hours(1)),
        ];

        let recent: Vec<&str> = recent_by_role(&history, ChatRole::User, RECENT_QUERY_DAYS, now)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(recent, vec!["second", "first"]);

        // restartable: a second call yields the same sequence
        let again = recent_by_role(&history, ChatRole::User, RECENT_QUERY_DAYS, now).count();
        assert_eq!(again, 2);

        assert_eq!(recent_by_role(&[], ChatRole::User, 7, now).count(), 0);
    }

    #[test]
    fn test_recent_by_role_includes_cutoff_instant() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let history = vec![ChatMessage::user("edge", now - Duration::days(7))];
        assert_eq!(recent_by_role(&history, ChatRole::User, 7, now).count(), 1);
    }

    #[test]
    fn test_latest_entries() {
        let latest = latest_entries(&[1, 2, 3, 4, 5, 6], 5);
        assert_eq!(latest, vec![6, 5, 4, 3, 2]);
        assert!(latest_entries::<i32>(&[], 5).is_empty());
    }

    #[test]
    fn test_series_for_chart_fills_missing_days() {
        let history = vec![
            entry("2024-03-08", Mood::Happy),
            entry("2024-03-10", Mood::Anxious),
            entry("2024-02-01", Mood::Tired),
        ];
        let series = series_for_chart(&history, MOOD_CHART_DAYS, day(2024, 3, 10), NEUTRAL_CHART_VALUE);

        assert_eq!(series.len(), 7);
        assert_eq!(series.first().unwrap().day_key, "2024-03-04");
        assert_eq!(series.last().unwrap().day_key, "2024-03-10");

        let values: Vec<i32> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![3, 3, 3, 3, 4, 3, 1]);
    }

    #[test]
    fn test_series_for_chart_with_empty_history() {
        let series = series_for_chart(&[], 14, day(2024, 1, 5), NEUTRAL_CHART_VALUE);
        assert_eq!(series.len(), 14);
        assert!(series.iter().all(|p| p.value == NEUTRAL_CHART_VALUE));
        assert_eq!(series[0].day_key, "2023-12-23");
    }

    #[test]
    fn test_series_for_chart_unknown_label_is_neutral() {
        let history = vec![MoodEntry {
            date: "2024-03-10".to_string(),
            mood: "excited".to_string(),
        }];
        let series = series_for_chart(&history, 1, day(2024, 3, 10), NEUTRAL_CHART_VALUE);
        assert_eq!(series, vec![ChartPoint { day_key: "2024-03-10".to_string(), value: 3 }]);
    }
}
