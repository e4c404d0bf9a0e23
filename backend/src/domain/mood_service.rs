use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{info, warn};
use shared::{ChartPoint, Mood, MoodEntry};
use std::sync::Arc;

use super::commands::mood::{RecordMoodCommand, RecordMoodResult};
use super::date_engine::DateEngine;
use super::history::{series_for_chart, upsert_daily_entry, MOOD_HISTORY_WINDOW, NEUTRAL_CHART_VALUE};
use super::write_locks::KeyedWriteLocks;
use crate::storage::{load_list, load_typed, save_typed, CloudStore, StoreKey};

/// Daily mood check-ins and the 14-day history behind the mood curve
#[derive(Clone)]
pub struct MoodService {
    store: Arc<dyn CloudStore>,
    engine: DateEngine,
    locks: KeyedWriteLocks,
}

impl MoodService {
    pub fn new(store: Arc<dyn CloudStore>, engine: DateEngine, locks: KeyedWriteLocks) -> Self {
        Self { store, engine, locks }
    }

    /// Save the selection and fold it into today's history slot
    pub async fn record_mood(&self, command: RecordMoodCommand, now: DateTime<Utc>) -> Result<RecordMoodResult> {
        let RecordMoodCommand { user_id, mood } = command;
        let day_key = self.engine.format_day_key(now);
        info!("Recording mood {} for user {} on {}", mood, user_id, day_key);

        {
            let _guard = self.locks.acquire(&user_id, StoreKey::DailyMood).await;
            save_typed(self.store.as_ref(), &user_id, StoreKey::DailyMood, mood.label()).await?;
        }

        let _guard = self.locks.acquire(&user_id, StoreKey::MoodHistory).await;
        let history: Vec<MoodEntry> = load_list(self.store.as_ref(), &user_id, StoreKey::MoodHistory).await?;
        let history = upsert_daily_entry(history, MoodEntry::new(day_key, mood), MOOD_HISTORY_WINDOW);
        save_typed(self.store.as_ref(), &user_id, StoreKey::MoodHistory, &history).await?;

        info!("Mood history for user {} now holds {} entries", user_id, history.len());
        Ok(RecordMoodResult { mood, history })
    }

    /// Last selection; 平靜 when nothing usable is stored
    pub async fn current_mood(&self, user_id: &str) -> Result<Mood> {
        let label: Option<String> = load_typed(self.store.as_ref(), user_id, StoreKey::DailyMood).await?;
        Ok(match label {
            None => Mood::default(),
            Some(label) => Mood::from_label(&label).unwrap_or_else(|e| {
                warn!("Stored mood for user {} is not recognised: {}", user_id, e);
                Mood::default()
            }),
        })
    }

    pub async fn mood_history(&self, user_id: &str) -> Result<Vec<MoodEntry>> {
        load_list(self.store.as_ref(), user_id, StoreKey::MoodHistory).await
    }

    /// One point per day for the `days` days ending today, oldest first
    pub async fn mood_chart(&self, user_id: &str, days: usize, now: DateTime<Utc>) -> Result<Vec<ChartPoint>> {
        let history = self.mood_history(user_id).await?;
        Ok(series_for_chart(&history, days, self.engine.today(now), NEUTRAL_CHART_VALUE))
    }
}
