//! Absolute instants and validity checks around a scheduling form.
//!
//! All functions take explicit inputs, including the "now" anchor, so they
//! never read the system clock.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Result, SchedulingError};
use crate::values::{ScheduleDuration, TemporalPoint, TemporalValues};

/// Combine a `YYYY-MM-DD` date with an hour and minute into an instant in
/// `timezone`.
///
/// When the local time is ambiguous (the repeated hour of a DST fall-back) the
/// earlier instant is returned.
///
/// # Errors
///
/// Returns [`SchedulingError::InvalidDatetime`] if the date cannot be parsed or
/// the local time does not exist (a DST spring-forward gap),
/// [`SchedulingError::InvalidTimezone`] for an unknown IANA name, and
/// [`SchedulingError::InvalidTemporalValue`] if hour or minute are out of range.
///
/// # Examples
///
/// ```
/// use scheduling_engine::parse_date;
///
/// let dt = parse_date("2018-01-20", 10, 25, "Europe/Berlin").unwrap();
/// assert_eq!(dt.to_rfc3339(), "2018-01-20T10:25:00+01:00");
/// ```
pub fn parse_date(date: &str, hour: u32, minute: u32, timezone: &str) -> Result<DateTime<Tz>> {
    let tz = parse_timezone(timezone)?;
    let date = parse_iso_date(date)?;
    local_instant(date, hour, minute, &tz)
}

/// Whether an event starting at `start` and lasting `duration` is over at `now`.
///
/// # Errors
///
/// Propagates the errors of [`parse_date`], and returns
/// [`SchedulingError::InvalidTemporalValue`] if the end would overflow.
pub fn already_ended(
    start: &TemporalPoint,
    duration: &ScheduleDuration,
    timezone: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    duration.validate()?;
    let begin = start.to_datetime(timezone)?;

    let minutes = i64::try_from(duration.total_minutes())
        .ok()
        .and_then(TimeDelta::try_minutes)
        .ok_or_else(|| {
            SchedulingError::InvalidTemporalValue(format!(
                "duration out of range: {}h{}m",
                duration.hour, duration.minute
            ))
        })?;
    let end = begin.checked_add_signed(minutes).ok_or_else(|| {
        SchedulingError::InvalidTemporalValue(format!("end of event starting {begin} overflows"))
    })?;

    Ok(end < now)
}

/// Whether the end time of day is earlier than the start time of day.
///
/// Dates are ignored: on a recurring schedule this flags a weekday whose
/// occurrences would end before they begin.
///
/// # Errors
///
/// Returns [`SchedulingError::InvalidTemporalValue`] if any hour or minute is
/// out of range.
pub fn is_end_before_start(values: &TemporalValues) -> Result<bool> {
    values.validate()?;
    Ok(values.end.minute_of_day() < values.start.minute_of_day())
}

/// Whether `end.date` falls on an earlier day than `start.date`.
///
/// On a recurring schedule `end.date` is the last day of the series, so this
/// catches a series that ends before its first occurrence.
pub fn is_end_date_before_start_date(values: &TemporalValues) -> bool {
    values.end.date < values.start.date
}

/// Zero-padded `HH:MM` rendering of a duration.
///
/// ```
/// use scheduling_engine::{format_duration, ScheduleDuration};
///
/// assert_eq!(format_duration(&ScheduleDuration::new(2, 5)), "02:05");
/// ```
pub fn format_duration(duration: &ScheduleDuration) -> String {
    format!("{:02}:{:02}", duration.hour, duration.minute)
}

// ── Internal helpers ────────────────────────────────────────────────────────

pub(crate) fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| SchedulingError::InvalidTimezone(format!("'{}'", s)))
}

pub(crate) fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| SchedulingError::InvalidDatetime(format!("'{}': {}", s, e)))
}

pub(crate) fn local_instant(
    date: NaiveDate,
    hour: u32,
    minute: u32,
    tz: &Tz,
) -> Result<DateTime<Tz>> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        SchedulingError::InvalidTemporalValue(format!("{hour:02}:{minute:02} is not a time of day"))
    })?;

    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(SchedulingError::InvalidDatetime(format!(
            "{date} {time} does not exist in {}",
            tz.name()
        ))),
    }
}
