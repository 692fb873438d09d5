//! Keep a start/end/duration triple consistent after a partial edit.
//!
//! The form calls [`apply_temporal_value_change`] every time the user edits
//! one of the three fields. The edited field is authoritative; the other two
//! are rewritten so that `end = start + duration` holds again.
//!
//! # Date changes
//!
//! For a single event the end date follows the arithmetic: an event starting
//! at 23:00 with a two hour duration ends on the next day. When editing a
//! recurring schedule each occurrence gets its date from the recurrence rule,
//! and `end.date` holds the last day of the series instead. In that mode the
//! reconciler still rolls the time of day over midnight but never touches
//! `end.date`.
//!
//! # Negative intervals
//!
//! An end time of day earlier than the start time of day always means the
//! event crosses midnight. The computed duration is therefore in `[0, 24h)`
//! whenever it is derived from the start and end fields.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};
use crate::values::{ChangedField, ScheduleDuration, TemporalValues};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// How the form being edited schedules its events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    /// One event; the end date follows the start date and duration.
    #[default]
    Single,
    /// A recurring or bulk schedule; `end.date` is owned by the recurrence.
    Multiple,
}

impl ScheduleMode {
    pub fn allows_date_change(self) -> bool {
        matches!(self, ScheduleMode::Single)
    }
}

/// Recompute the fields not named by `changed` so the triple is consistent.
///
/// * [`ChangedField::Start`] / [`ChangedField::End`]: the duration is
///   re-derived from the two times of day, wrapping past midnight when the end
///   is earlier than the start. With `allow_date_change`, `end.date` becomes
///   `start.date` (plus one day when wrapped).
/// * [`ChangedField::Duration`]: the end time of day is `start + duration`,
///   normalized to 0-23/0-59. With `allow_date_change`, `end.date` advances by
///   the number of midnights crossed.
///
/// Calling it twice with the same arguments changes nothing the second time.
///
/// # Errors
///
/// Returns [`SchedulingError::InvalidTemporalValue`] if any hour or minute is
/// out of range, or if the end date would overflow the calendar. `values` is
/// left untouched on error.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use scheduling_engine::{
///     apply_temporal_value_change, ChangedField, ScheduleDuration, TemporalPoint, TemporalValues,
/// };
///
/// let day = NaiveDate::from_ymd_opt(2018, 1, 20).unwrap();
/// let mut values = TemporalValues::new(
///     TemporalPoint::new(day, 10, 25),
///     TemporalPoint::new(day, 12, 40),
///     ScheduleDuration::new(3, 2),
/// );
/// apply_temporal_value_change(&mut values, ChangedField::Duration, true).unwrap();
/// assert_eq!((values.end.hour, values.end.minute), (13, 27));
/// ```
pub fn apply_temporal_value_change(
    values: &mut TemporalValues,
    changed: ChangedField,
    allow_date_change: bool,
) -> Result<()> {
    let updated = match reconciled(values, changed, allow_date_change) {
        Ok(updated) => updated,
        Err(e) => {
            tracing::warn!(field = %changed, error = %e, "rejected temporal value change");
            return Err(e);
        }
    };

    tracing::debug!(
        field = %changed,
        allow_date_change,
        duration_hour = updated.duration.hour,
        duration_minute = updated.duration.minute,
        end_date = %updated.end.date,
        "reconciled temporal values"
    );

    *values = updated;
    Ok(())
}

impl TemporalValues {
    /// [`apply_temporal_value_change`] with the date policy taken from `mode`.
    pub fn apply_change(&mut self, changed: ChangedField, mode: ScheduleMode) -> Result<()> {
        apply_temporal_value_change(self, changed, mode.allows_date_change())
    }
}

fn reconciled(
    values: &TemporalValues,
    changed: ChangedField,
    allow_date_change: bool,
) -> Result<TemporalValues> {
    values.validate()?;
    let mut out = *values;

    match changed {
        // Both edits leave the two points authoritative; only the interval
        // between them (and the end date it implies) is derived.
        ChangedField::Start | ChangedField::End => {
            let start = values.start.minute_of_day();
            let end = values.end.minute_of_day();
            let wrapped = end < start;
            let minutes = if wrapped {
                MINUTES_PER_DAY - start + end
            } else {
                end - start
            };

            out.duration = ScheduleDuration::from_minutes(minutes);
            if allow_date_change {
                out.end.date = add_days(values.start.date, u64::from(wrapped))?;
            }
        }
        ChangedField::Duration => {
            let total =
                u64::from(values.start.minute_of_day()) + values.duration.total_minutes();
            let days = total / u64::from(MINUTES_PER_DAY);
            let minute_of_day = (total % u64::from(MINUTES_PER_DAY)) as u32;

            out.end.hour = minute_of_day / 60;
            out.end.minute = minute_of_day % 60;
            if allow_date_change {
                out.end.date = add_days(values.start.date, days)?;
            }
        }
    }

    Ok(out)
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days)).ok_or_else(|| {
        SchedulingError::InvalidTemporalValue(format!(
            "end date overflows the calendar: {date} + {days} days"
        ))
    })
}
