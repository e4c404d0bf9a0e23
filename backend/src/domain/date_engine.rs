//! Pregnancy date arithmetic.
//!
//! Everything here is pure: callers pass "now" in, nothing reads the clock.
//! Day keys and elapsed-day counts go through the same [`DayBoundary`], so a
//! mood logged "today" and the progress shown "today" always agree on which
//! calendar day that is.

use chrono::{DateTime, Days, FixedOffset, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::GestationalAge;
use std::fmt;

use super::error::TrackerError;

/// Days from the last menstrual period to the expected delivery date
pub const PREGNANCY_DAYS: u64 = 280;

/// Shown when the user has not entered any pregnancy dates yet
pub const FALLBACK_PROGRESS: GestationalAge = GestationalAge {
    weeks: 14,
    days: 3,
    total_days: 101,
};

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Where one calendar day ends and the next begins.
///
/// `Utc` reproduces ISO-string truncation and is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DayBoundary {
    #[default]
    Utc,
    Local,
    Fixed(FixedOffset),
}

impl DayBoundary {
    /// Parse `utc`, `local`, or an offset like `+08:00` / `-05:30`
    pub fn parse(value: &str) -> Result<Self, TrackerError> {
        let value = value.trim();
        match value.to_ascii_lowercase().as_str() {
            "utc" | "z" | "" => return Ok(DayBoundary::Utc),
            "local" => return Ok(DayBoundary::Local),
            _ => {}
        }

        let invalid = || TrackerError::InvalidDate(format!("invalid timezone offset '{}'", value));

        let (sign, rest) = match value.as_bytes().first() {
            Some(b'+') => (1, &value[1..]),
            Some(b'-') => (-1, &value[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(DayBoundary::Fixed)
            .ok_or_else(invalid)
    }

    /// The calendar day an instant falls on under this boundary
    pub fn calendar_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            DayBoundary::Utc => instant.date_naive(),
            DayBoundary::Local => instant.with_timezone(&Local).date_naive(),
            DayBoundary::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }
}

impl fmt::Display for DayBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayBoundary::Utc => write!(f, "utc"),
            DayBoundary::Local => write!(f, "local"),
            DayBoundary::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

impl TryFrom<String> for DayBoundary {
    type Error = TrackerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DayBoundary::parse(&value)
    }
}

impl From<DayBoundary> for String {
    fn from(value: DayBoundary) -> Self {
        value.to_string()
    }
}

/// Stateless date calculator bound to one day-boundary policy
#[derive(Debug, Clone, Copy, Default)]
pub struct DateEngine {
    boundary: DayBoundary,
}

impl DateEngine {
    pub fn new(boundary: DayBoundary) -> Self {
        Self { boundary }
    }

    pub fn boundary(&self) -> DayBoundary {
        self.boundary
    }

    /// Calendar day of `now` under the configured boundary
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.boundary.calendar_day(now)
    }

    /// Canonical `YYYY-MM-DD` key for an instant
    pub fn format_day_key(&self, instant: DateTime<Utc>) -> String {
        format_date(self.today(instant))
    }

    /// Parse a day key or an RFC 3339 timestamp into a calendar day
    pub fn parse_day(&self, input: &str) -> Result<NaiveDate, TrackerError> {
        let input = input.trim();
        if let Ok(date) = NaiveDate::parse_from_str(input, DAY_KEY_FORMAT) {
            return Ok(date);
        }
        if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
            return Ok(self.boundary.calendar_day(instant.with_timezone(&Utc)));
        }
        Err(TrackerError::InvalidDate(input.to_string()))
    }

    /// Gestational age at `now` for an LMP anchor, or the fallback when unset
    pub fn progress_from_anchor(
        &self,
        anchor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<GestationalAge, TrackerError> {
        let anchor = match anchor.map(str::trim) {
            Some(value) if !value.is_empty() => self.parse_day(value)?,
            _ => return Ok(FALLBACK_PROGRESS),
        };
        Ok(progress_between(anchor, self.today(now)))
    }

    pub fn due_date_from_lmp(&self, lmp: &str) -> Result<String, TrackerError> {
        let lmp = self.parse_day(lmp)?;
        due_date_for(lmp).map(format_date)
    }

    pub fn lmp_from_due_date(&self, due_date: &str) -> Result<String, TrackerError> {
        let due_date = self.parse_day(due_date)?;
        lmp_for(due_date).map(format_date)
    }
}

/// Whole calendar days from `anchor` to `today`, floored at zero
pub fn progress_between(anchor: NaiveDate, today: NaiveDate) -> GestationalAge {
    let elapsed = (today - anchor).num_days().clamp(0, u32::MAX as i64) as u32;
    GestationalAge::from_total_days(elapsed)
}

pub fn due_date_for(lmp: NaiveDate) -> Result<NaiveDate, TrackerError> {
    lmp.checked_add_days(Days::new(PREGNANCY_DAYS))
        .ok_or_else(|| TrackerError::InvalidDate(format!("{} is out of range", lmp)))
}

pub fn lmp_for(due_date: NaiveDate) -> Result<NaiveDate, TrackerError> {
    due_date
        .checked_sub_days(Days::new(PREGNANCY_DAYS))
        .ok_or_else(|| TrackerError::InvalidDate(format!("{} is out of range", due_date)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_due_date_from_lmp() {
        let engine = DateEngine::default();
        assert_eq!(engine.due_date_from_lmp("2024-01-01").unwrap(), "2024-10-07");
        assert_eq!(engine.lmp_from_due_date("2024-10-07").unwrap(), "2024-01-01");
    }

    #[test]
    fn test_due_date_round_trips_for_every_day() {
        let engine = DateEngine::default();
        let mut day = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();

        while day < end {
            let key = format_date(day);
            let due = engine.due_date_from_lmp(&key).unwrap();
            assert_eq!(engine.lmp_from_due_date(&due).unwrap(), key);
            assert_eq!(engine.due_date_from_lmp(&engine.lmp_from_due_date(&key).unwrap()).unwrap(), key);

            let due_day = engine.parse_day(&due).unwrap();
            assert_eq!((due_day - day).num_days(), 280);

            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_progress_from_anchor() {
        let engine = DateEngine::default();
        let progress = engine
            .progress_from_anchor(Some("2024-01-01"), at(2024, 1, 15, 10))
            .unwrap();
        assert_eq!(progress, GestationalAge { weeks: 2, days: 0, total_days: 14 });

        let progress = engine
            .progress_from_anchor(Some("2024-01-01"), at(2024, 4, 11, 0))
            .unwrap();
        assert_eq!(progress, GestationalAge { weeks: 14, days: 3, total_days: 101 });
    }

    #[test]
    fn test_progress_without_anchor_uses_fallback() {
        let engine = DateEngine::default();
        assert_eq!(engine.progress_from_anchor(None, at(2024, 1, 1, 0)).unwrap(), FALLBACK_PROGRESS);
        assert_eq!(engine.progress_from_anchor(Some("  "), at(2024, 1, 1, 0)).unwrap(), FALLBACK_PROGRESS);
        assert_eq!(FALLBACK_PROGRESS.weeks, 14);
        assert_eq!(FALLBACK_PROGRESS.days, 3);
    }

    #[test]
    fn test_future_anchor_clamps_to_zero() {
        let engine = DateEngine::default();
        let progress = engine
            .progress_from_anchor(Some("2030-06-01"), at(2024, 1, 1, 0))
            .unwrap();
        assert_eq!(progress, GestationalAge { weeks: 0, days: 0, total_days: 0 });
    }

    #[test]
    fn test_invalid_dates_are_rejected() {
        let engine = DateEngine::default();
        assert!(matches!(engine.due_date_from_lmp("not-a-date"), Err(TrackerError::InvalidDate(_))));
        assert!(matches!(engine.lmp_from_due_date("2024-02-30"), Err(TrackerError::InvalidDate(_))));
        assert!(matches!(
            engine.progress_from_anchor(Some("yesterday"), at(2024, 1, 1, 0)),
            Err(TrackerError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_parse_day_accepts_timestamps() {
        let engine = DateEngine::default();
        let day = engine.parse_day("2024-03-01T23:30:00-02:00").unwrap();
        assert_eq!(format_date(day), "2024-03-02");
    }

    #[test]
    fn test_format_day_key_follows_boundary() {
        let instant = at(2024, 3, 1, 20);
        assert_eq!(DateEngine::default().format_day_key(instant), "2024-03-01");

        let taipei = DateEngine::new(DayBoundary::parse("+08:00").unwrap());
        assert_eq!(taipei.format_day_key(instant), "2024-03-02");

        // progress counts days on the same boundary as the key
        let progress = taipei.progress_from_anchor(Some("2024-03-01"), instant).unwrap();
        assert_eq!(progress.total_days, 1);
    }

    #[test]
    fn test_day_boundary_parse() {
        assert_eq!(DayBoundary::parse("UTC").unwrap(), DayBoundary::Utc);
        assert_eq!(DayBoundary::parse("local").unwrap(), DayBoundary::Local);
        assert_eq!(
            DayBoundary::parse("-05:30").unwrap(),
            DayBoundary::Fixed(FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap())
        );
        assert!(DayBoundary::parse("+25:00").is_err());
        assert!(DayBoundary::parse("Asia/Taipei").is_err());
    }

    #[test]
    fn test_day_boundary_serde() {
        let boundary: DayBoundary = serde_json::from_str("\"+08:00\"").unwrap();
        assert_eq!(boundary.to_string(), "+08:00");
        assert_eq!(serde_json::to_string(&DayBoundary::Utc).unwrap(), "\"utc\"");
    }
}
