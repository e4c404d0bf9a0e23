//! # Profile Service
//!
//! Pregnancy dates and the profile overview built on top of them.
//!
//! Only the LMP is persisted (`startDate`). A due date entered by the user is
//! projected back to its LMP before saving, so the stored record can never
//! hold two anchors that disagree.

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{info, warn};
use shared::{ProfileSettings, User};
use std::sync::Arc;

use super::assistant_service::AssistantService;
use super::commands::profile::{ProfileOverview, ProgressResult, UpdatePregnancyDatesCommand};
use super::date_engine::{DateEngine, FALLBACK_PROGRESS};
use super::error::{ProfileValidationError, TrackerError};
use super::history::MOOD_CHART_DAYS;
use super::mood_service::MoodService;
use super::pregnancy_anchor::PregnancyAnchor;
use super::write_locks::KeyedWriteLocks;
use crate::storage::{load_typed, save_typed, CloudStore, StoreKey};

/// Messages inspected for the overview's recent questions
pub const RECENT_INTERACTION_COUNT: usize = 5;

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn CloudStore>,
    engine: DateEngine,
    locks: KeyedWriteLocks,
    mood_service: MoodService,
    assistant_service: AssistantService,
}

impl ProfileService {
    pub fn new(
        store: Arc<dyn CloudStore>,
        engine: DateEngine,
        locks: KeyedWriteLocks,
        mood_service: MoodService,
        assistant_service: AssistantService,
    ) -> Self {
        Self {
            store,
            engine,
            locks,
            mood_service,
            assistant_service,
        }
    }

    /// Stored settings record, empty when never saved
    pub async fn settings(&self, user_id: &str) -> Result<ProfileSettings> {
        let settings = load_typed(self.store.as_ref(), user_id, StoreKey::ProfileSettings).await?;
        Ok(settings.unwrap_or_default())
    }

    pub async fn anchor(&self, user_id: &str) -> Result<Option<PregnancyAnchor>> {
        let settings = self.settings(user_id).await?;
        Ok(PregnancyAnchor::from_settings(&self.engine, &settings)?)
    }

    /// Validate the edit form and persist the resulting LMP
    pub async fn update_pregnancy_dates(
        &self,
        command: UpdatePregnancyDatesCommand,
        now: DateTime<Utc>,
    ) -> Result<PregnancyAnchor> {
        let anchor = self.anchor_from_input(command.lmp.as_deref(), command.due_date.as_deref())?;
        info!(
            "Updating pregnancy dates for user {}: LMP {}, due {}",
            command.user_id,
            anchor.lmp_key(),
            anchor.due_date_key()
        );

        let settings = ProfileSettings {
            start_date: Some(anchor.lmp_key()),
            due_date: None,
            updated_at: now.to_rfc3339(),
        };

        let _guard = self.locks.acquire(&command.user_id, StoreKey::ProfileSettings).await;
        save_typed(self.store.as_ref(), &command.user_id, StoreKey::ProfileSettings, &settings).await?;

        Ok(anchor)
    }

    /// Mirror one date onto the other without saving anything
    pub fn convert_dates(&self, lmp: Option<&str>, due_date: Option<&str>) -> Result<PregnancyAnchor> {
        self.anchor_from_input(lmp, due_date)
    }

    /// Gestational age today; the fallback when no anchor is stored
    pub async fn progress(&self, user_id: &str, now: DateTime<Utc>) -> Result<ProgressResult> {
        let anchor = match self.anchor(user_id).await {
            Ok(anchor) => anchor,
            Err(e) if is_invalid_date(&e) => {
                warn!("Stored pregnancy dates for user {} are unreadable: {}", user_id, e);
                None
            }
            Err(e) => return Err(e),
        };

        let progress = anchor
            .map(|anchor| anchor.progress_on(self.engine.today(now)))
            .unwrap_or(FALLBACK_PROGRESS);
        Ok(ProgressResult { progress, anchor })
    }

    pub async fn overview(&self, user: &User, now: DateTime<Utc>) -> Result<ProfileOverview> {
        info!("Building profile overview for user {}", user.uid);
        let today = self.engine.today(now);

        let ProgressResult { progress, anchor } = self.progress(&user.uid, now).await?;
        let mood_chart = self.mood_service.mood_chart(&user.uid, MOOD_CHART_DAYS, now).await?;
        let recent_queries = self
            .assistant_service
            .recent_interactions(&user.uid, RECENT_INTERACTION_COUNT)
            .await?;

        Ok(ProfileOverview {
            user: user.clone(),
            progress,
            days_until_due: anchor.map(|a| a.days_until_due(today)),
            trimester: anchor.map(|_| PregnancyAnchor::trimester(&progress)),
            anchor,
            mood_chart,
            recent_queries,
        })
    }

    fn anchor_from_input(&self, lmp: Option<&str>, due_date: Option<&str>) -> Result<PregnancyAnchor> {
        let anchor = match (present(lmp), present(due_date)) {
            (Some(_), Some(_)) => return Err(ProfileValidationError::ConflictingAnchors.into()),
            (None, None) => return Err(ProfileValidationError::MissingAnchor.into()),
            (Some(lmp), None) => PregnancyAnchor::from_lmp(self.engine.parse_day(lmp)?)?,
            (None, Some(due_date)) => PregnancyAnchor::from_due_date(self.engine.parse_day(due_date)?)?,
        };
        Ok(anchor)
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_invalid_date(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<TrackerError>(),
        Some(TrackerError::InvalidDate(_))
    )
}
