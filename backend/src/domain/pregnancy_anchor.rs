use chrono::NaiveDate;
use shared::{GestationalAge, ProfileSettings};

use super::date_engine::{due_date_for, format_date, lmp_for, progress_between, DateEngine};
use super::error::TrackerError;

/// The single calendar fact a pregnancy is dated from.
///
/// Only the LMP is held; the due date is always projected from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PregnancyAnchor {
    lmp: NaiveDate,
}

impl PregnancyAnchor {
    pub fn from_lmp(lmp: NaiveDate) -> Result<Self, TrackerError> {
        // reject anchors whose due date would not be representable
        due_date_for(lmp)?;
        Ok(Self { lmp })
    }

    pub fn from_due_date(due_date: NaiveDate) -> Result<Self, TrackerError> {
        Ok(Self { lmp: lmp_for(due_date)? })
    }

    /// Read the anchor out of a stored settings record.
    ///
    /// `startDate` wins; records that only carry `dueDate` are projected back.
    pub fn from_settings(
        engine: &DateEngine,
        settings: &ProfileSettings,
    ) -> Result<Option<Self>, TrackerError> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        if let Some(lmp) = present(&settings.start_date) {
            return Self::from_lmp(engine.parse_day(&lmp)?).map(Some);
        }
        if let Some(due_date) = present(&settings.due_date) {
            return Self::from_due_date(engine.parse_day(&due_date)?).map(Some);
        }
        Ok(None)
    }

    pub fn lmp(&self) -> NaiveDate {
        self.lmp
    }

    pub fn due_date(&self) -> NaiveDate {
        // checked in the constructors
        due_date_for(self.lmp).unwrap_or(NaiveDate::MAX)
    }

    pub fn lmp_key(&self) -> String {
        format_date(self.lmp)
    }

    pub fn due_date_key(&self) -> String {
        format_date(self.due_date())
    }

    pub fn progress_on(&self, today: NaiveDate) -> GestationalAge {
        progress_between(self.lmp, today)
    }

    /// Negative once the due date has passed
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date() - today).num_days()
    }

    /// 1: weeks 0-13, 2: weeks 14-27, 3: week 28 onwards
    pub fn trimester(progress: &GestationalAge) -> u8 {
        match progress.weeks {
            0..=13 => 1,
            14..=27 => 2,
            _ => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_projections_agree() {
        let from_lmp = PregnancyAnchor::from_lmp(day(2024, 1, 1)).unwrap();
        let from_due = PregnancyAnchor::from_due_date(day(2024, 10, 7)).unwrap();

        assert_eq!(from_lmp, from_due);
        assert_eq!(from_lmp.due_date_key(), "2024-10-07");
        assert_eq!(from_due.lmp_key(), "2024-01-01");
    }

    #[test]
    fn test_from_settings_prefers_start_date() {
        let engine = DateEngine::default();
        let settings = ProfileSettings {
            start_date: Some("2024-01-01".to_string()),
            due_date: Some("2025-01-01".to_string()),
            updated_at: String::new(),
        };
        let anchor = PregnancyAnchor::from_settings(&engine, &settings).unwrap().unwrap();
        assert_eq!(anchor.lmp_key(), "2024-01-01");
    }

    #[test]
    fn test_from_settings_with_legacy_due_date_only() {
        let engine = DateEngine::default();
        let settings = ProfileSettings {
            start_date: Some(String::new()),
            due_date: Some("2024-10-07".to_string()),
            updated_at: String::new(),
        };
        let anchor = PregnancyAnchor::from_settings(&engine, &settings).unwrap().unwrap();
        assert_eq!(anchor.lmp_key(), "2024-01-01");
    }

    #[test]
    fn test_from_settings_empty_and_invalid() {
        let engine = DateEngine::default();
        assert_eq!(
            PregnancyAnchor::from_settings(&engine, &ProfileSettings::default()).unwrap(),
            None
        );

        let broken = ProfileSettings {
            start_date: Some("01/01/2024".to_string()),
            due_date: None,
            updated_at: String::new(),
        };
        assert!(PregnancyAnchor::from_settings(&engine, &broken).is_err());
    }

    #[test]
    fn test_days_until_due_and_trimester() {
        let anchor = PregnancyAnchor::from_lmp(day(2024, 1, 1)).unwrap();
        assert_eq!(anchor.days_until_due(day(2024, 10, 1)), 6);
        assert_eq!(anchor.days_until_due(day(2024, 10, 8)), -1);

        let first = anchor.progress_on(day(2024, 2, 1));
        let second = anchor.progress_on(day(2024, 4, 11));
        let third = anchor.progress_on(day(2024, 8, 1));
        assert_eq!(PregnancyAnchor::trimester(&first), 1);
        assert_eq!(PregnancyAnchor::trimester(&second), 2);
        assert_eq!(PregnancyAnchor::trimester(&third), 3);
    }
}
