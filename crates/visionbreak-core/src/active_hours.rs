//! Active-hours window.
//!
//! A time-of-day window (optionally weekdays only) during which automatic
//! breaks may trigger. Stored as `HH:MM` strings so the settings file stays
//! hand-editable. When `end` precedes `start` the window wraps past midnight.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveHours {
    #[serde(default = "default_start")]
    pub start: String,
    #[serde(default = "default_end")]
    pub end: String,
    #[serde(default = "default_weekdays_only")]
    pub weekdays_only: bool,
}

fn default_start() -> String {
    "09:00".into()
}
fn default_end() -> String {
    "17:00".into()
}
fn default_weekdays_only() -> bool {
    true
}

impl Default for ActiveHours {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            weekdays_only: default_weekdays_only(),
        }
    }
}

/// Parse an `HH:MM` time of day.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ValidationError::InvalidTimeOfDay(value.to_string()))
}

impl ActiveHours {
    /// Check both bounds parse.
    pub fn validate(&self) -> Result<(), ValidationError> {
        parse_time_of_day(&self.start)?;
        parse_time_of_day(&self.end)?;
        Ok(())
    }

    /// Whether `local` falls inside the window.
    ///
    /// Equal bounds mean the whole day is active.
    pub fn contains(&self, local: NaiveDateTime) -> Result<bool, ValidationError> {
        let start = parse_time_of_day(&self.start)?;
        let end = parse_time_of_day(&self.end)?;

        if self.weekdays_only && matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return Ok(false);
        }

        let t = local.time();
        let inside = if start == end {
            true
        } else if start < end {
            t >= start && t < end
        } else {
            t >= start || t < end
        };
        Ok(inside)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn default_window_is_office_hours() {
        let hours = ActiveHours::default();
        // 2026-10-14 is a Wednesday.
        assert!(hours.contains(at(2026, 10, 14, 9, 0)).unwrap());
        assert!(hours.contains(at(2026, 10, 14, 16, 59)).unwrap());
        assert!(!hours.contains(at(2026, 10, 14, 17, 0)).unwrap());
        assert!(!hours.contains(at(2026, 10, 14, 8, 59)).unwrap());
    }

    #[test]
    fn weekends_excluded_when_weekdays_only() {
        let hours = ActiveHours::default();
        // 2026-10-17 is a Saturday.
        assert!(!hours.contains(at(2026, 10, 17, 12, 0)).unwrap());

        let every_day = ActiveHours {
            weekdays_only: false,
            ..ActiveHours::default()
        };
        assert!(every_day.contains(at(2026, 10, 17, 12, 0)).unwrap());
    }

    #[test]
    fn window_wraps_past_midnight() {
        let night = ActiveHours {
            start: "22:00".into(),
            end: "06:00".into(),
            weekdays_only: false,
        };
        assert!(night.contains(at(2026, 10, 14, 23, 30)).unwrap());
        assert!(night.contains(at(2026, 10, 15, 5, 59)).unwrap());
        assert!(!night.contains(at(2026, 10, 15, 12, 0)).unwrap());
    }

    #[test]
    fn equal_bounds_cover_whole_day() {
        let always = ActiveHours {
            start: "00:00".into(),
            end: "00:00".into(),
            weekdays_only: false,
        };
        assert!(always.contains(at(2026, 10, 14, 3, 0)).unwrap());
    }

    #[test]
    fn malformed_time_is_rejected() {
        let bad = ActiveHours {
            start: "9am".into(),
            ..ActiveHours::default()
        };
        assert_eq!(
            bad.validate(),
            Err(ValidationError::InvalidTimeOfDay("9am".into()))
        );
        assert!(bad.contains(at(2026, 10, 14, 10, 0)).is_err());
    }
}
