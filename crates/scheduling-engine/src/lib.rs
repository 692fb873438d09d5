//! # scheduling-engine
//!
//! Start/end/duration bookkeeping for event scheduling forms.
//!
//! A scheduling form holds three linked values: when the event starts, when it
//! ends, and how long it lasts. Whenever the user edits one of them, the
//! other two must follow. This crate does that arithmetic deterministically,
//! including rollover past midnight and the recurring-schedule case where end
//! dates are owned elsewhere.
//!
//! ## Modules
//!
//! - [`values`] — The start/end/duration triple and its JSON form model
//! - [`reconcile`] — Recompute the derived fields after an edit
//! - [`timestamp`] — Absolute instants, "already ended" and end-before-start checks
//! - [`defaults`] — Organisation defaults for seeding a new event
//! - [`weekly`] — Per-weekday triples for bulk editing recurring events
//! - [`error`] — Error types

pub mod defaults;
pub mod error;
pub mod reconcile;
pub mod timestamp;
pub mod values;
pub mod weekly;

pub use defaults::SchedulingDefaults;
pub use error::SchedulingError;
pub use reconcile::{apply_temporal_value_change, ScheduleMode};
pub use timestamp::{
    already_ended, format_duration, is_end_before_start, is_end_date_before_start_date, parse_date,
};
pub use values::{ChangedField, ScheduleDuration, TemporalPoint, TemporalValues};
pub use weekly::WeeklySchedule;
