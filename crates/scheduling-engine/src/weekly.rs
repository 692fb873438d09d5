//! Per-weekday scheduling for bulk edits of recurring events.
//!
//! Editing several scheduled events at once groups them by weekday; each
//! weekday carries its own start/end/duration triple. Dates on these triples
//! belong to the individual events, so every reconciliation runs in
//! [`ScheduleMode::Multiple`]. A weekday whose end time of day ends up before
//! its start is marked invalid until a later edit fixes it.

use chrono::Weekday;

use crate::error::{Result, SchedulingError};
use crate::reconcile::ScheduleMode;
use crate::timestamp::is_end_before_start;
use crate::values::{ChangedField, TemporalValues};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    // Indexed by days from Monday.
    entries: [Option<TemporalValues>; 7],
    invalid: [bool; 7],
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the triple for `weekday`, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::InvalidTemporalValue`] if `values` fails
    /// validation; the schedule is left unchanged.
    pub fn insert(
        &mut self,
        weekday: Weekday,
        values: TemporalValues,
    ) -> Result<Option<TemporalValues>> {
        let invalid = is_end_before_start(&values)?;
        let idx = index(weekday);
        self.invalid[idx] = invalid;
        Ok(self.entries[idx].replace(values))
    }

    pub fn get(&self, weekday: Weekday) -> Option<&TemporalValues> {
        self.entries[index(weekday)].as_ref()
    }

    /// Mutable access for the form to write an edit before calling
    /// [`on_temporal_value_change`](Self::on_temporal_value_change).
    pub fn get_mut(&mut self, weekday: Weekday) -> Option<&mut TemporalValues> {
        self.entries[index(weekday)].as_mut()
    }

    /// Reconcile the triple of `weekday` after the user edited `changed`.
    ///
    /// Returns whether the weekday is now invalid (end before start).
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::InvalidTemporalValue`] if no triple is set for
    /// `weekday` or the triple fails validation.
    pub fn on_temporal_value_change(
        &mut self,
        weekday: Weekday,
        changed: ChangedField,
    ) -> Result<bool> {
        let idx = index(weekday);
        let values = self.entries[idx].as_mut().ok_or_else(|| {
            SchedulingError::InvalidTemporalValue(format!("no scheduling entry for {weekday}"))
        })?;

        values.apply_change(changed, ScheduleMode::Multiple)?;

        let invalid = is_end_before_start(values)?;
        if invalid && !self.has_invalid_dates() {
            tracing::info!(%weekday, "end before start");
        }
        self.invalid[idx] = invalid;
        Ok(invalid)
    }

    pub fn has_invalid_dates(&self) -> bool {
        self.invalid.iter().any(|&flag| flag)
    }

    /// Invalid weekdays, Monday first.
    pub fn invalid_weekdays(&self) -> Vec<Weekday> {
        self.weekdays()
            .filter(|day| self.invalid[index(*day)])
            .collect()
    }

    /// Weekdays that have a triple, Monday first.
    pub fn scheduled_weekdays(&self) -> Vec<Weekday> {
        self.weekdays()
            .filter(|day| self.entries[index(*day)].is_some())
            .collect()
    }

    fn weekdays(&self) -> impl Iterator<Item = Weekday> {
        std::iter::successors(Some(Weekday::Mon), |day| Some(day.succ())).take(7)
    }
}

fn index(weekday: Weekday) -> usize {
    weekday.num_days_from_monday() as usize
}
