//! Feature assembly
//!
//! This module rolls the calendar encodings and the adjacency score into one
//! fixed-order 14-dimensional vector:
//! - season one-hot (4)
//! - normalized day-of-month (1)
//! - normalized time-of-day (1)
//! - weekday one-hot (7)
//! - adjacency score (1)
//!
//! Column order is identical at training and inference time.

use crate::adjacency::adjacent_visit_score;
use crate::calendar::{
    normalize_day, weekday_one_hot, Season, TimeOfDay, WorkingHours, SEASON_COUNT,
};
use crate::error::PipelineError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Total feature vector dimension
pub const FEATURE_DIM: usize = 14;

/// Stable per-column names, in vector order
pub const FEATURE_NAMES: [&str; FEATURE_DIM] = [
    "season_spring",
    "season_summer",
    "season_fall",
    "season_winter",
    "day_of_month",
    "time_of_day",
    "weekday_mon",
    "weekday_tue",
    "weekday_wed",
    "weekday_thu",
    "weekday_fri",
    "weekday_sat",
    "weekday_sun",
    "adjacent_visits",
];

/// Fixed-length numeric feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_DIM]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_DIM]) -> Self {
        FeatureVector(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Value of the trailing adjacency column
    pub fn adjacency(&self) -> f64 {
        self.0[FEATURE_DIM - 1]
    }

    /// Value of the normalized time-of-day column
    pub fn time_of_day(&self) -> f64 {
        self.0[SEASON_COUNT + 1]
    }
}

/// Assembles feature vectors from calendar components and adjacency context
#[derive(Debug, Clone, Copy)]
pub struct FeatureAssembler {
    working_hours: WorkingHours,
    adjacency_window_days: i64,
}

impl FeatureAssembler {
    pub fn new(working_hours: WorkingHours, adjacency_window_days: i64) -> Self {
        Self {
            working_hours,
            adjacency_window_days,
        }
    }

    /// Assemble a feature vector from a raw clock time, normalizing it
    /// against the working-hours window internally
    pub fn assemble(
        &self,
        date: NaiveDate,
        time: &TimeOfDay,
        weekday: Weekday,
        known_dates: &[NaiveDate],
    ) -> Result<FeatureVector, PipelineError> {
        let normalized = self.working_hours.normalize_time(time);
        self.assemble_with_normalized_time(date, normalized, weekday, known_dates)
    }

    /// Assemble a feature vector from an already-normalized time scalar.
    /// Used at inference time and for synthesized negative samples, where
    /// the time is computed once upstream.
    pub fn assemble_with_normalized_time(
        &self,
        date: NaiveDate,
        normalized_time: f64,
        weekday: Weekday,
        known_dates: &[NaiveDate],
    ) -> Result<FeatureVector, PipelineError> {
        let season = Season::from_month(date.month())?;

        let mut values = [0.0; FEATURE_DIM];
        values[..4].copy_from_slice(&season.one_hot());
        values[4] = normalize_day(date);
        values[5] = normalized_time;
        values[6..13].copy_from_slice(&weekday_one_hot(weekday));
        values[13] = adjacent_visit_score(date, known_dates, self.adjacency_window_days);

        Ok(FeatureVector(values))
    }
}

impl Default for FeatureAssembler {
    fn default() -> Self {
        Self::new(
            WorkingHours::default(),
            crate::adjacency::DEFAULT_ADJACENCY_WINDOW_DAYS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_vector_is_always_14_wide() {
        let assembler = FeatureAssembler::default();
        for (m, d, weekday) in [
            (1, 15, Weekday::Wed),
            (4, 1, Weekday::Mon),
            (7, 31, Weekday::Sun),
            (10, 9, Weekday::Fri),
        ] {
            let vector = assembler
                .assemble(date(2020, m, d), &TimeOfDay::on_the_hour(10), weekday, &[])
                .unwrap();
            assert_eq!(vector.as_slice().len(), FEATURE_DIM);
        }
    }

    #[test]
    fn test_fixed_column_order() {
        let assembler = FeatureAssembler::default();
        let known = [date(2020, 4, 9)];
        let vector = assembler
            .assemble(
                date(2020, 4, 10),
                &TimeOfDay { hour: 13, minute: 30 },
                Weekday::Fri,
                &known,
            )
            .unwrap();

        let expected = [
            1.0, 0.0, 0.0, 0.0, // spring
            10.0 / 31.0, // day
            0.5, // 13:30 in a 9-18 window
            0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, // friday
            0.25, // one visit in a 4-day window
        ];
        for (actual, expected) in vector.as_slice().iter().zip(expected.iter()) {
            assert!((actual - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_raw_and_normalized_variants_agree() {
        let assembler = FeatureAssembler::default();
        let d = date(2020, 11, 20);
        let known = [date(2020, 11, 18), date(2020, 11, 19)];

        let raw = assembler
            .assemble(d, &TimeOfDay::on_the_hour(14), Weekday::Fri, &known)
            .unwrap();
        let normalized = WorkingHours::default().normalize(14, 0);
        let direct = assembler
            .assemble_with_normalized_time(d, normalized, Weekday::Fri, &known)
            .unwrap();

        assert_eq!(raw, direct);
    }

    #[test]
    fn test_feature_names_match_dimension() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_DIM);
    }
}
