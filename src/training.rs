//! Training-set synthesis
//!
//! Builds the labeled matrix the classifier consumes:
//! - Positive pass: one `Present` example per parsed attendance record, at
//!   the observed time.
//! - Negative pass: for each calendar date strictly between the earliest and
//!   latest observed date with no record, `sample_size` `Absent` examples at
//!   uniformly random on-the-hour times inside the working window.
//! - Merge: positives first, then negatives, then an optional
//!   pair-preserving shuffle.
//!
//! Every example, positive or negative, is scored against the full observed
//! date list. Negative samples therefore see dates that lie in their future;
//! the look-ahead is kept on purpose since removing it would change what the
//! model learns.
//!
//! All randomness flows through an injected `Rng`; the seeded entry point
//! uses ChaCha8 so synthesis is reproducible in tests and the CLI.

use crate::adjacency::DEFAULT_ADJACENCY_WINDOW_DAYS;
use crate::calendar::WorkingHours;
use crate::error::PipelineError;
use crate::features::{FeatureAssembler, FeatureVector, FEATURE_DIM, FEATURE_NAMES};
use crate::parser::AttendanceRecord;
use chrono::{Datelike, Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Binary presence label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Absent,
    Present,
}

impl Label {
    pub fn as_u8(self) -> u8 {
        match self {
            Label::Absent => 0,
            Label::Present => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        self.as_u8() as f64
    }
}

/// Parallel feature matrix and label vector
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    pub features: Vec<FeatureVector>,
    pub labels: Vec<Label>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Uniform random shuffle preserving row-label correspondence
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut rows: Vec<(FeatureVector, Label)> = self
            .features
            .drain(..)
            .zip(self.labels.drain(..))
            .collect();
        rows.shuffle(rng);

        for (features, label) in rows {
            self.features.push(features);
            self.labels.push(label);
        }
    }

    /// Newline-delimited JSON, one `{features, label}` row per line
    pub fn to_ndjson(&self) -> Result<String, PipelineError> {
        let mut lines = Vec::with_capacity(self.len());
        for row in self.rows() {
            lines.push(serde_json::to_string(&row)?);
        }
        Ok(lines.join("\n") + "\n")
    }

    /// Single JSON document carrying column names alongside the rows
    pub fn to_json(&self, pretty: bool) -> Result<String, PipelineError> {
        let export = DatasetExport {
            feature_names: FEATURE_NAMES,
            rows: self.rows(),
        };
        let json = if pretty {
            serde_json::to_string_pretty(&export)?
        } else {
            serde_json::to_string(&export)?
        };
        Ok(json)
    }

    fn rows(&self) -> Vec<DatasetRow<'_>> {
        self.features
            .iter()
            .zip(self.labels.iter())
            .map(|(features, label)| DatasetRow {
                features: features.as_slice(),
                label: label.as_u8(),
            })
            .collect()
    }
}

#[derive(Serialize)]
struct DatasetRow<'a> {
    features: &'a [f64],
    label: u8,
}

#[derive(Serialize)]
struct DatasetExport<'a> {
    feature_names: [&'static str; FEATURE_DIM],
    rows: Vec<DatasetRow<'a>>,
}

/// Configurable synthesizer for labeled training sets
#[derive(Debug, Clone, Copy)]
pub struct TrainingSetBuilder {
    working_hours: WorkingHours,
    adjacency_window_days: i64,
    sample_size: usize,
    shuffle: bool,
}

impl Default for TrainingSetBuilder {
    fn default() -> Self {
        Self {
            working_hours: WorkingHours::default(),
            adjacency_window_days: DEFAULT_ADJACENCY_WINDOW_DAYS,
            sample_size: 1,
            shuffle: true,
        }
    }
}

impl TrainingSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_hours(mut self, working_hours: WorkingHours) -> Self {
        self.working_hours = working_hours;
        self
    }

    pub fn with_adjacency_window_days(mut self, window_days: i64) -> Self {
        self.adjacency_window_days = window_days;
        self
    }

    /// Negative examples synthesized per missing date
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Synthesize with a caller-provided random source
    pub fn synthesize<R: Rng>(
        &self,
        records: &[AttendanceRecord],
        observed_dates: &[NaiveDate],
        rng: &mut R,
    ) -> Result<TrainingSet, PipelineError> {
        let assembler = FeatureAssembler::new(self.working_hours, self.adjacency_window_days);

        let mut features = Vec::new();
        let mut labels = Vec::new();

        // Positive pass: one example per observed record
        for record in records {
            let vector =
                assembler.assemble(record.date, &record.time, record.weekday, observed_dates)?;
            features.push(vector);
            labels.push(Label::Present);
        }

        // Negative pass over the gap dates
        self.synthesize_negatives(&assembler, observed_dates, &mut features, &mut labels, rng)?;

        let mut set = TrainingSet { features, labels };
        if self.shuffle {
            set.shuffle(rng);
        }
        Ok(set)
    }

    /// Synthesize with a ChaCha8 generator seeded from `seed`
    pub fn synthesize_seeded(
        &self,
        records: &[AttendanceRecord],
        observed_dates: &[NaiveDate],
        seed: u64,
    ) -> Result<TrainingSet, PipelineError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.synthesize(records, observed_dates, &mut rng)
    }

    fn synthesize_negatives<R: Rng>(
        &self,
        assembler: &FeatureAssembler,
        observed_dates: &[NaiveDate],
        features: &mut Vec<FeatureVector>,
        labels: &mut Vec<Label>,
        rng: &mut R,
    ) -> Result<(), PipelineError> {
        let distinct: BTreeSet<NaiveDate> = observed_dates.iter().copied().collect();

        let (Some(&start), Some(&end)) = (distinct.first(), distinct.last()) else {
            return Err(PipelineError::InsufficientDates(0));
        };
        if start == end {
            return Err(PipelineError::InsufficientDates(1));
        }

        let mut cursor = start + Duration::days(1);
        while cursor <= end {
            if !distinct.contains(&cursor) {
                for _ in 0..self.sample_size {
                    // Inclusive on both ends, so a sample can land exactly
                    // at the end of the window (normalized time 1.0)
                    let hour = rng.gen_range(
                        self.working_hours.start_hour()..=self.working_hours.end_hour(),
                    );
                    let normalized = self.working_hours.normalize(hour, 0);
                    let vector = assembler.assemble_with_normalized_time(
                        cursor,
                        normalized,
                        cursor.weekday(),
                        observed_dates,
                    )?;
                    features.push(vector);
                    labels.push(Label::Absent);
                }
            }
            cursor = cursor + Duration::days(1);
        }

        Ok(())
    }
}
