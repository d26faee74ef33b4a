//! Error types for the attendance pipeline

use thiserror::Error;

/// Errors that can occur during feature synthesis, training-set
/// construction, or prediction
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Unknown weekday symbol: {0}")]
    UnknownWeekday(String),

    #[error("Unknown meridiem symbol: {0}")]
    UnknownMeridiem(String),

    #[error("Invalid clock time: {0}")]
    InvalidClock(String),

    #[error("Invalid date token: {0}")]
    InvalidDate(String),

    #[error("Malformed record line: {0}")]
    MalformedRecord(String),

    #[error("Invalid working hours: start {start} must be before end {end}, both within 0-23")]
    InvalidWorkingHours { start: u32, end: u32 },

    #[error("Insufficient distinct dates for negative sampling: found {0}, need at least 2")]
    InsufficientDates(usize),

    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Model has not been fitted")]
    ModelNotFitted,

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
