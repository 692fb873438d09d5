//! Error types for scheduling-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("Invalid temporal value: {0}")]
    InvalidTemporalValue(String),

    #[error("Unsupported changed field: {0}")]
    UnsupportedChangedField(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SchedulingError>;
