//! Calendar encoding
//!
//! This module converts calendar components into the numeric encodings the
//! feature pipeline consumes:
//! - Month to season, one-hot over a fixed 4-element vocabulary
//! - Day-of-month normalized against a fixed 31-day month
//! - Time-of-day normalized against the working-hours window
//! - Weekday one-hot over the fixed Mon..Sun vocabulary
//!
//! Vocabularies are process-wide constants so column order is identical at
//! training and inference time.

use crate::error::PipelineError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Day-of-month normalization divisor, applied uniformly to every month
pub const MONTH_TOTAL_DAYS: f64 = 31.0;

/// Number of seasons in the one-hot vocabulary
pub const SEASON_COUNT: usize = 4;

/// Number of weekdays in the one-hot vocabulary
pub const WEEKDAY_COUNT: usize = 7;

/// Season derived from the month, in canonical one-hot column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Map a month (1-12) to its season: 3-5 spring, 6-8 summer,
    /// 9-11 fall, 12/1/2 winter
    pub fn from_month(month: u32) -> Result<Season, PipelineError> {
        match month {
            3..=5 => Ok(Season::Spring),
            6..=8 => Ok(Season::Summer),
            9..=11 => Ok(Season::Fall),
            12 | 1 | 2 => Ok(Season::Winter),
            other => Err(PipelineError::InvalidMonth(other)),
        }
    }

    /// One-hot vector in canonical order [spring, summer, fall, winter]
    pub fn one_hot(self) -> [f64; SEASON_COUNT] {
        let mut vector = [0.0; SEASON_COUNT];
        vector[self as usize] = 1.0;
        vector
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        }
    }
}

/// Meridiem indicator carried by raw log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// Parse a meridiem symbol. Accepts the English forms (case-insensitive)
    /// and the Korean forms the source logs carry.
    pub fn from_symbol(symbol: &str) -> Result<Meridiem, PipelineError> {
        match symbol.to_lowercase().as_str() {
            "am" | "오전" => Ok(Meridiem::Am),
            "pm" | "오후" => Ok(Meridiem::Pm),
            _ => Err(PipelineError::UnknownMeridiem(symbol.to_string())),
        }
    }
}

/// Clock time within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    /// Parse an `"H:MM"` clock string qualified by a meridiem indicator.
    ///
    /// PM with hour != 12 adds 12; PM at 12 stays 12 (noon). AM hours pass
    /// through unchanged, including AM 12, which stays 12 rather than
    /// wrapping to 0. The source data never carries a midnight check-in,
    /// so the literal behavior is kept as-is.
    ///
    /// Segments past the minute (a seconds field) are ignored.
    pub fn from_clock(meridiem: Meridiem, clock: &str) -> Result<TimeOfDay, PipelineError> {
        let mut splits = clock.split(':');
        let hour = splits
            .next()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .ok_or_else(|| PipelineError::InvalidClock(clock.to_string()))?;
        let minute = splits
            .next()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .ok_or_else(|| PipelineError::InvalidClock(clock.to_string()))?;

        let hour = match meridiem {
            Meridiem::Pm if hour != 12 => hour + 12,
            _ => hour,
        };

        if hour > 23 || minute > 59 {
            return Err(PipelineError::InvalidClock(clock.to_string()));
        }

        Ok(TimeOfDay { hour, minute })
    }

    /// Time at the top of the given hour, as synthesized for negative samples
    pub fn on_the_hour(hour: u32) -> TimeOfDay {
        TimeOfDay { hour, minute: 0 }
    }
}

/// Working-hours window used to normalize time-of-day features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    start_hour: u32,
    end_hour: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        // Standard 9-to-18 office day
        WorkingHours {
            start_hour: 9,
            end_hour: 18,
        }
    }
}

impl WorkingHours {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<WorkingHours, PipelineError> {
        if start_hour >= end_hour || end_hour > 23 {
            return Err(PipelineError::InvalidWorkingHours {
                start: start_hour,
                end: end_hour,
            });
        }
        Ok(WorkingHours {
            start_hour,
            end_hour,
        })
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    fn total_minutes(&self) -> f64 {
        ((self.end_hour - self.start_hour) * 60) as f64
    }

    /// Normalize an (hour, minute) pair against the window: 0.0 at the
    /// window start, 1.0 at the window end. Out-of-window times produce
    /// values outside [0, 1]; the feature is a signed offset, not a clamp.
    pub fn normalize(&self, hour: u32, minute: u32) -> f64 {
        let offset = (hour as i64 - self.start_hour as i64) * 60 + minute as i64;
        offset as f64 / self.total_minutes()
    }

    /// Normalize a parsed clock time against the window
    pub fn normalize_time(&self, time: &TimeOfDay) -> f64 {
        self.normalize(time.hour, time.minute)
    }
}

/// Normalized day-of-month: `day / 31` regardless of the month's length
pub fn normalize_day(date: NaiveDate) -> f64 {
    date.day() as f64 / MONTH_TOTAL_DAYS
}

/// Parse a weekday symbol. Accepts the English abbreviations
/// (case-insensitive) and the Korean single-syllable forms.
pub fn weekday_from_symbol(symbol: &str) -> Result<Weekday, PipelineError> {
    match symbol.trim().to_lowercase().as_str() {
        "mon" | "월" => Ok(Weekday::Mon),
        "tue" | "화" => Ok(Weekday::Tue),
        "wed" | "수" => Ok(Weekday::Wed),
        "thu" | "목" => Ok(Weekday::Thu),
        "fri" | "금" => Ok(Weekday::Fri),
        "sat" | "토" => Ok(Weekday::Sat),
        "sun" | "일" => Ok(Weekday::Sun),
        _ => Err(PipelineError::UnknownWeekday(symbol.to_string())),
    }
}

/// One-hot vector over the fixed Mon..Sun vocabulary
pub fn weekday_one_hot(weekday: Weekday) -> [f64; WEEKDAY_COUNT] {
    let mut vector = [0.0; WEEKDAY_COUNT];
    vector[weekday.num_days_from_monday() as usize] = 1.0;
    vector
}
