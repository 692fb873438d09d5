//! Form edits as the admin console performs them.

use chrono::NaiveDate;
use scheduling_engine::{
    apply_temporal_value_change, ChangedField, ScheduleDuration, SchedulingError, TemporalPoint,
    TemporalValues,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn scheduling() -> TemporalValues {
    TemporalValues::new(
        TemporalPoint::new(date(2018, 1, 20), 10, 25),
        TemporalPoint::new(date(2018, 1, 20), 12, 40),
        ScheduleDuration::new(3, 2),
    )
}

#[test]
fn unchanged_start_still_fixes_stale_duration() {
    let mut values = scheduling();
    apply_temporal_value_change(&mut values, ChangedField::Start, true).unwrap();
    assert_eq!(values.duration, ScheduleDuration::new(2, 15));
}

#[test]
fn duration_edit_moves_end() {
    let mut values = scheduling();
    apply_temporal_value_change(&mut values, ChangedField::Duration, true).unwrap();
    assert_eq!(values.end, TemporalPoint::new(date(2018, 1, 20), 13, 27));
}

#[test]
fn long_duration_rolls_to_next_day() {
    let mut values = scheduling();
    values.duration.hour = 23;
    apply_temporal_value_change(&mut values, ChangedField::Duration, true).unwrap();
    assert_eq!(values.end, TemporalPoint::new(date(2018, 1, 21), 9, 27));
}

#[test]
fn long_duration_in_recurring_mode_keeps_date() {
    let mut values = scheduling();
    values.duration.hour = 23;
    apply_temporal_value_change(&mut values, ChangedField::Duration, false).unwrap();
    assert_eq!(values.end, TemporalPoint::new(date(2018, 1, 20), 9, 27));
}

#[test]
fn end_earlier_than_start_crosses_midnight() {
    let mut values = scheduling();
    values.end.hour = 9;
    values.end.minute = 55;
    apply_temporal_value_change(&mut values, ChangedField::End, true).unwrap();
    assert_eq!(values.end.date, date(2018, 1, 21));
    assert_eq!(values.duration, ScheduleDuration::new(23, 30));
}

#[test]
fn form_model_json_edit() {
    let json = r#"{
        "start": {"date": "2018-01-20", "hour": 10, "minute": 25},
        "end": {"date": "2018-01-20", "hour": 12, "minute": 40},
        "duration": {"hour": 23, "minute": 2}
    }"#;
    let mut values = TemporalValues::from_json(json).unwrap();
    apply_temporal_value_change(&mut values, "duration".parse().unwrap(), true).unwrap();

    let out: serde_json::Value = serde_json::from_str(&values.to_json().unwrap()).unwrap();
    assert_eq!(out["end"]["date"], "2018-01-21");
    assert_eq!(out["end"]["hour"], 9);
    assert_eq!(out["end"]["minute"], 27);
}

#[test]
fn unknown_field_name_is_rejected() {
    let err = "location".parse::<ChangedField>().unwrap_err();
    assert!(matches!(err, SchedulingError::UnsupportedChangedField(_)));
}
