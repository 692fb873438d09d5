//! The `{start, end, duration}` triple held by a scheduling form.
//!
//! A [`TemporalValues`] is owned by the caller (the form state) and handed to
//! the reconciler after each edit. The JSON shape matches what the admin
//! console keeps in its form model:
//!
//! ```json
//! {
//!   "start":    { "date": "2018-01-20", "hour": 10, "minute": 25 },
//!   "end":      { "date": "2018-01-20", "hour": 12, "minute": 40 },
//!   "duration": { "hour": 2, "minute": 15 }
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};
use crate::timestamp;

/// A calendar date plus a wall-clock hour and minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalPoint {
    pub date: NaiveDate,
    /// Hour of day (0-23).
    pub hour: u32,
    /// Minute of hour (0-59).
    pub minute: u32,
}

impl TemporalPoint {
    pub fn new(date: NaiveDate, hour: u32, minute: u32) -> Self {
        Self { date, hour, minute }
    }

    /// Minutes elapsed since midnight.
    ///
    /// Saturates instead of overflowing on unvalidated hours.
    pub fn minute_of_day(&self) -> u32 {
        self.hour.saturating_mul(60).saturating_add(self.minute)
    }

    /// Resolve this point to an absolute instant in `timezone`.
    ///
    /// # Errors
    ///
    /// See [`timestamp::parse_date`].
    pub fn to_datetime(&self, timezone: &str) -> Result<DateTime<Tz>> {
        let tz = timestamp::parse_timezone(timezone)?;
        timestamp::local_instant(self.date, self.hour, self.minute, &tz)
    }

    fn validate(&self, label: &str) -> Result<()> {
        if self.hour > 23 {
            return Err(SchedulingError::InvalidTemporalValue(format!(
                "{label}.hour must be 0-23, got {}",
                self.hour
            )));
        }
        if self.minute > 59 {
            return Err(SchedulingError::InvalidTemporalValue(format!(
                "{label}.minute must be 0-59, got {}",
                self.minute
            )));
        }
        Ok(())
    }
}

/// Length of a scheduled event in whole hours and minutes.
///
/// `hour` is unbounded; a duration of 30 hours is legal and spans midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleDuration {
    pub hour: u32,
    /// Minute part (0-59).
    pub minute: u32,
}

impl ScheduleDuration {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Split a minute count into normalized hour/minute parts.
    pub fn from_minutes(total: u32) -> Self {
        Self {
            hour: total / 60,
            minute: total % 60,
        }
    }

    pub fn total_minutes(&self) -> u64 {
        u64::from(self.hour) * 60 + u64::from(self.minute)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.minute > 59 {
            return Err(SchedulingError::InvalidTemporalValue(format!(
                "duration.minute must be 0-59, got {}",
                self.minute
            )));
        }
        Ok(())
    }
}

/// The start/end/duration triple of one scheduled event (or one weekday of a
/// recurring schedule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalValues {
    pub start: TemporalPoint,
    pub end: TemporalPoint,
    pub duration: ScheduleDuration,
}

impl TemporalValues {
    pub fn new(start: TemporalPoint, end: TemporalPoint, duration: ScheduleDuration) -> Self {
        Self {
            start,
            end,
            duration,
        }
    }

    /// Check every hour/minute against its canonical range.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::InvalidTemporalValue`] naming the first
    /// offending field.
    pub fn validate(&self) -> Result<()> {
        self.start.validate("start")?;
        self.end.validate("end")?;
        self.duration.validate()
    }

    /// Parse the form model from JSON and validate it.
    ///
    /// Missing fields, non-numeric hours/minutes and malformed dates are all
    /// reported as [`SchedulingError::InvalidTemporalValue`].
    pub fn from_json(json: &str) -> Result<Self> {
        let values: Self = serde_json::from_str(json)
            .map_err(|e| SchedulingError::InvalidTemporalValue(e.to_string()))?;
        values.validate()?;
        Ok(values)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SchedulingError::InvalidTemporalValue(e.to_string()))
    }
}

/// Which part of the triple the user just edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangedField {
    Start,
    End,
    Duration,
}

impl ChangedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangedField::Start => "start",
            ChangedField::End => "end",
            ChangedField::Duration => "duration",
        }
    }
}

impl fmt::Display for ChangedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangedField {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(ChangedField::Start),
            "end" => Ok(ChangedField::End),
            "duration" => Ok(ChangedField::Duration),
            other => Err(SchedulingError::UnsupportedChangedField(format!("'{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> TemporalValues {
        TemporalValues::new(
            TemporalPoint::new(date(2018, 1, 20), 10, 25),
            TemporalPoint::new(date(2018, 1, 20), 12, 40),
            ScheduleDuration::new(2, 15),
        )
    }

    #[test]
    fn test_minute_of_day() {
        assert_eq!(TemporalPoint::new(date(2018, 1, 20), 10, 25).minute_of_day(), 625);
        assert_eq!(TemporalPoint::new(date(2018, 1, 20), 0, 0).minute_of_day(), 0);
    }

    #[test]
    fn test_minute_of_day_saturates_on_huge_hour() {
        let point = TemporalPoint::new(date(2018, 1, 20), u32::MAX, 59);
        assert_eq!(point.minute_of_day(), u32::MAX);
    }

    #[test]
    fn test_duration_from_minutes_normalizes() {
        assert_eq!(ScheduleDuration::from_minutes(135), ScheduleDuration::new(2, 15));
        assert_eq!(ScheduleDuration::from_minutes(59), ScheduleDuration::new(0, 59));
        assert_eq!(ScheduleDuration::new(25, 3).total_minutes(), 1503);
    }

    #[test]
    fn test_validate_accepts_canonical_values() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_hour_24() {
        let mut values = sample();
        values.start.hour = 24;
        let err = values.validate().unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidTemporalValue(_)));
        assert!(err.to_string().contains("start.hour"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_end_minute_60() {
        let mut values = sample();
        values.end.minute = 60;
        let err = values.validate().unwrap_err();
        assert!(err.to_string().contains("end.minute"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_duration_minute_60() {
        let mut values = sample();
        values.duration.minute = 60;
        assert!(values.validate().is_err());
    }

    #[test]
    fn test_validate_allows_long_durations() {
        let mut values = sample();
        values.duration.hour = 48;
        assert!(values.validate().is_ok());
    }

    #[test]
    fn test_from_json_form_model() {
        let json = r#"{
            "start": {"date": "2018-01-20", "hour": 10, "minute": 25},
            "end": {"date": "2018-01-20", "hour": 12, "minute": 40},
            "duration": {"hour": 2, "minute": 15}
        }"#;
        assert_eq!(TemporalValues::from_json(json).unwrap(), sample());
    }

    #[test]
    fn test_from_json_missing_date_is_invalid_value() {
        let json = r#"{
            "start": {"hour": 10, "minute": 25},
            "end": {"date": "2018-01-20", "hour": 12, "minute": 40},
            "duration": {"hour": 2, "minute": 15}
        }"#;
        let err = TemporalValues::from_json(json).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidTemporalValue(_)));
    }

    #[test]
    fn test_from_json_non_numeric_hour_is_invalid_value() {
        let json = r#"{
            "start": {"date": "2018-01-20", "hour": "ten", "minute": 25},
            "end": {"date": "2018-01-20", "hour": 12, "minute": 40},
            "duration": {"hour": 2, "minute": 15}
        }"#;
        let err = TemporalValues::from_json(json).unwrap_err();
        assert!(err.to_string().contains("Invalid temporal value"), "got: {err}");
    }

    #[test]
    fn test_from_json_negative_minute_is_invalid_value() {
        let json = r#"{
            "start": {"date": "2018-01-20", "hour": 10, "minute": -5},
            "end": {"date": "2018-01-20", "hour": 12, "minute": 40},
            "duration": {"hour": 2, "minute": 15}
        }"#;
        assert!(TemporalValues::from_json(json).is_err());
    }

    #[test]
    fn test_to_json_uses_iso_dates() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"2018-01-20\""), "got: {json}");
        assert_eq!(TemporalValues::from_json(&json).unwrap(), sample());
    }

    #[test]
    fn test_changed_field_parse() {
        assert_eq!("start".parse::<ChangedField>().unwrap(), ChangedField::Start);
        assert_eq!("end".parse::<ChangedField>().unwrap(), ChangedField::End);
        assert_eq!(
            "duration".parse::<ChangedField>().unwrap(),
            ChangedField::Duration
        );
    }

    #[test]
    fn test_changed_field_rejects_unknown() {
        let err = "location".parse::<ChangedField>().unwrap_err();
        assert!(matches!(err, SchedulingError::UnsupportedChangedField(_)));
        assert!(err.to_string().contains("'location'"), "got: {err}");
    }

    #[test]
    fn test_changed_field_display() {
        assert_eq!(ChangedField::Duration.to_string(), "duration");
    }
}
