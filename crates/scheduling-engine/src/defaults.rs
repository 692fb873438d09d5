//! Organisation defaults used to seed a new event's scheduling form.
//!
//! The form opens with the next free slot of the day: slots start at
//! `start_time` and repeat every `interval_minutes`; once a slot would begin
//! at or after `end_time` the form falls back to tomorrow's first slot.
//!
//! Defaults come either from a TOML file
//!
//! ```toml
//! start_time = "08:00"
//! end_time = "20:00"
//! duration_minutes = 55
//! interval_minutes = 60
//! ```
//!
//! or from the organisation properties the console exposes
//! (`admin.event.new.start_time` and friends). Missing keys keep their
//! defaults.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Days, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};
use crate::timestamp::parse_timezone;
use crate::values::{ScheduleDuration, TemporalPoint, TemporalValues};

pub const START_TIME_PROPERTY: &str = "admin.event.new.start_time";
pub const END_TIME_PROPERTY: &str = "admin.event.new.end_time";
pub const DURATION_PROPERTY: &str = "admin.event.new.duration";
pub const INTERVAL_PROPERTY: &str = "admin.event.new.interval";

/// Slot rules for seeding a new event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingDefaults {
    /// First slot of the day.
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// Slots starting at or after this time roll over to the next day.
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub duration_minutes: u32,
    pub interval_minutes: u32,
}

impl Default for SchedulingDefaults {
    fn default() -> Self {
        Self {
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            end_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default(),
            duration_minutes: 55,
            interval_minutes: 60,
        }
    }
}

impl SchedulingDefaults {
    /// Load defaults from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SchedulingError::InvalidConfig(format!("'{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse defaults from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let defaults: Self =
            toml::from_str(content).map_err(|e| SchedulingError::InvalidConfig(e.to_string()))?;
        defaults.validate()?;
        Ok(defaults)
    }

    /// Build defaults from organisation properties.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self> {
        let mut defaults = Self::default();

        if let Some(value) = properties.get(START_TIME_PROPERTY) {
            defaults.start_time = parse_property_time(START_TIME_PROPERTY, value)?;
        }
        if let Some(value) = properties.get(END_TIME_PROPERTY) {
            defaults.end_time = parse_property_time(END_TIME_PROPERTY, value)?;
        }
        if let Some(value) = properties.get(DURATION_PROPERTY) {
            defaults.duration_minutes = parse_property_minutes(DURATION_PROPERTY, value)?;
        }
        if let Some(value) = properties.get(INTERVAL_PROPERTY) {
            defaults.interval_minutes = parse_property_minutes(INTERVAL_PROPERTY, value)?;
        }

        defaults.validate()?;
        Ok(defaults)
    }

    pub fn validate(&self) -> Result<()> {
        if self.duration_minutes == 0 {
            return Err(SchedulingError::InvalidConfig(
                "duration_minutes must be greater than 0".to_string(),
            ));
        }
        if self.interval_minutes == 0 {
            return Err(SchedulingError::InvalidConfig(
                "interval_minutes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Seed the scheduling form for an event created at local time `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::InvalidConfig`] if the defaults are invalid,
    /// or [`SchedulingError::InvalidDatetime`] if the slot falls off the
    /// calendar.
    pub fn default_schedule(&self, now: NaiveDateTime) -> Result<TemporalValues> {
        self.validate()?;
        let slot = self.next_slot(now)?;
        let end = slot
            .checked_add_signed(TimeDelta::minutes(i64::from(self.duration_minutes)))
            .ok_or_else(|| out_of_range(slot))?;

        tracing::debug!(%now, %slot, %end, "seeded default schedule");

        Ok(TemporalValues::new(
            point(slot),
            point(end),
            ScheduleDuration::from_minutes(self.duration_minutes),
        ))
    }

    /// [`default_schedule`](Self::default_schedule) for the wall-clock time
    /// `now` shows in `timezone`.
    pub fn default_schedule_in(&self, now: DateTime<Utc>, timezone: &str) -> Result<TemporalValues> {
        let tz = parse_timezone(timezone)?;
        self.default_schedule(now.with_timezone(&tz).naive_local())
    }

    fn next_slot(&self, now: NaiveDateTime) -> Result<NaiveDateTime> {
        let today = now.date();
        let first = today.and_time(self.start_time);
        if now <= first {
            return Ok(first);
        }

        let elapsed = (now - first).num_milliseconds();
        let interval = i64::from(self.interval_minutes) * 60_000;
        let steps = (elapsed + interval - 1) / interval;
        let slot = first
            .checked_add_signed(TimeDelta::milliseconds(steps * interval))
            .ok_or_else(|| out_of_range(first))?;

        if slot >= today.and_time(self.end_time) {
            let tomorrow = today
                .checked_add_days(Days::new(1))
                .ok_or_else(|| out_of_range(first))?;
            return Ok(tomorrow.and_time(self.start_time));
        }
        Ok(slot)
    }
}

fn point(dt: NaiveDateTime) -> TemporalPoint {
    TemporalPoint::new(dt.date(), dt.hour(), dt.minute())
}

fn out_of_range(dt: NaiveDateTime) -> SchedulingError {
    SchedulingError::InvalidDatetime(format!("slot after {dt} is out of range"))
}

fn parse_property_time(key: &str, value: &str) -> Result<NaiveTime> {
    hhmm::parse(value).map_err(|e| SchedulingError::InvalidConfig(format!("{key}: {e}")))
}

fn parse_property_minutes(key: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|e| SchedulingError::InvalidConfig(format!("{key}: '{value}': {e}")))
}

/// `HH:MM` (de)serialization for times of day.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn parse(s: &str) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(s.trim(), FORMAT).map_err(|e| format!("'{s}': {e}"))
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }
}
