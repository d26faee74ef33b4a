//! Pipeline orchestration
//!
//! Public API tying the stages together: parse the raw log, synthesize the
//! labeled training set, fit the classifier, then answer point queries for
//! a (date, hour) pair. `train_from_log` is the one-shot helper; `Predictor`
//! keeps the fitted model and date context for repeated queries.

use crate::calendar::{TimeOfDay, WorkingHours};
use crate::error::PipelineError;
use crate::features::FeatureAssembler;
use crate::model::{self, Classifier, DecisionTree};
use crate::parser;
use crate::training::{Label, TrainingSetBuilder};
use crate::{ENGINE_NAME, ENGINE_VERSION};
use chrono::{Datelike, NaiveDate};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use uuid::Uuid;

/// Knobs for training-set synthesis and feature assembly
#[derive(Debug, Clone, Copy)]
pub struct PredictorConfig {
    pub working_hours: WorkingHours,
    pub adjacency_window_days: i64,
    /// Negative examples synthesized per missing date
    pub sample_size: usize,
    pub shuffle: bool,
    /// Seed for negative sampling and shuffling; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            working_hours: WorkingHours::default(),
            adjacency_window_days: crate::adjacency::DEFAULT_ADJACENCY_WINDOW_DAYS,
            sample_size: 1,
            shuffle: true,
            seed: None,
        }
    }
}

/// Identifies the engine instance that produced a payload
#[derive(Debug, Clone, Serialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Report on one training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub producer: Producer,
    /// Parsed attendance records in the log
    pub records: usize,
    pub positive_examples: usize,
    pub negative_examples: usize,
    pub distinct_dates: usize,
    pub training_accuracy: f64,
}

/// Verdict for one (date, time) query
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub producer: Producer,
    pub date: NaiveDate,
    pub weekday: String,
    pub hour: u32,
    pub present: bool,
}

/// Stateful predictor: trains once, answers point queries
pub struct Predictor {
    config: PredictorConfig,
    classifier: Box<dyn Classifier>,
    assembler: FeatureAssembler,
    instance_id: String,
    /// Observed dates retained as adjacency context for inference
    dates: Vec<NaiveDate>,
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new()
    }
}

impl Predictor {
    /// Predictor with default settings and the bundled decision tree
    pub fn new() -> Self {
        Self::with_config(PredictorConfig::default())
    }

    pub fn with_config(config: PredictorConfig) -> Self {
        Self::with_classifier(config, Box::new(DecisionTree::default()))
    }

    /// Predictor backed by a caller-supplied classifier
    pub fn with_classifier(config: PredictorConfig, classifier: Box<dyn Classifier>) -> Self {
        Self {
            config,
            classifier,
            assembler: FeatureAssembler::new(config.working_hours, config.adjacency_window_days),
            instance_id: Uuid::new_v4().to_string(),
            dates: Vec::new(),
        }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Parse the log, synthesize the training set, and fit the classifier
    pub fn train(&mut self, log_text: &str) -> Result<TrainingSummary, PipelineError> {
        let records = parser::parse_log(log_text)?;
        let dates = parser::observed_dates(log_text)?;

        let builder = TrainingSetBuilder::new()
            .with_working_hours(self.config.working_hours)
            .with_adjacency_window_days(self.config.adjacency_window_days)
            .with_sample_size(self.config.sample_size)
            .with_shuffle(self.config.shuffle);

        let training_set = match self.config.seed {
            Some(seed) => builder.synthesize_seeded(&records, &dates, seed)?,
            None => {
                let mut rng = ChaCha8Rng::from_entropy();
                builder.synthesize(&records, &dates, &mut rng)?
            }
        };

        self.classifier.fit(&training_set)?;
        let training_accuracy = model::training_accuracy(self.classifier.as_ref(), &training_set)?;

        let distinct_dates = {
            let mut sorted = dates.clone();
            sorted.sort_unstable();
            sorted.dedup();
            sorted.len()
        };

        self.dates = dates;

        Ok(TrainingSummary {
            producer: self.producer(),
            records: records.len(),
            positive_examples: records.len(),
            negative_examples: training_set.len() - records.len(),
            distinct_dates,
            training_accuracy,
        })
    }

    /// Predict presence at the top of `hour` on `date`
    pub fn predict_at_hour(&self, date: NaiveDate, hour: u32) -> Result<Prediction, PipelineError> {
        let normalized = self.config.working_hours.normalize(hour, 0);
        let features = self.assembler.assemble_with_normalized_time(
            date,
            normalized,
            date.weekday(),
            &self.dates,
        )?;
        let label = self.classifier.predict(&features)?;
        Ok(self.prediction(date, hour, label))
    }

    /// Predict presence at a parsed clock time on `date`
    pub fn predict(&self, date: NaiveDate, time: &TimeOfDay) -> Result<Prediction, PipelineError> {
        let features = self
            .assembler
            .assemble(date, time, date.weekday(), &self.dates)?;
        let label = self.classifier.predict(&features)?;
        Ok(self.prediction(date, time.hour, label))
    }

    fn prediction(&self, date: NaiveDate, hour: u32, label: Label) -> Prediction {
        Prediction {
            producer: self.producer(),
            date,
            weekday: date.weekday().to_string(),
            hour,
            present: label == Label::Present,
        }
    }

    fn producer(&self) -> Producer {
        Producer {
            name: ENGINE_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        }
    }
}

/// One-shot helper: train a default predictor on a raw log
pub fn train_from_log(
    log_text: &str,
    seed: Option<u64>,
) -> Result<(Predictor, TrainingSummary), PipelineError> {
    let mut predictor = Predictor::with_config(PredictorConfig {
        seed,
        ..PredictorConfig::default()
    });
    let summary = predictor.train(log_text)?;
    Ok((predictor, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Three working weeks, weekends missing
    const SAMPLE_LOG: &str = "\
date,weekday
2020-3-2 AM 9:05,Mon,in
2020-3-3 AM 9:12,Tue,in
2020-3-4 AM 8:58,Wed,in
2020-3-5 AM 9:20,Thu,in
2020-3-6 AM 9:01,Fri,in
2020-3-9 AM 9:15,Mon,in
2020-3-10 AM 9:03,Tue,in
2020-3-11 AM 9:08,Wed,in
2020-3-12 AM 9:30,Thu,in
2020-3-13 AM 8:55,Fri,in
2020-3-16 AM 9:10,Mon,in
2020-3-17 AM 9:02,Tue,in
2020-3-18 AM 9:18,Wed,in
2020-3-19 AM 9:07,Thu,in
2020-3-20 AM 9:04,Fri,in
";

    #[test]
    fn test_train_summary_counts() {
        let (_, summary) = train_from_log(SAMPLE_LOG, Some(7)).unwrap();

        assert_eq!(summary.records, 15);
        assert_eq!(summary.positive_examples, 15);
        // Four weekend dates fall inside the range
        assert_eq!(summary.negative_examples, 4);
        assert_eq!(summary.distinct_dates, 15);
        assert!((0.0..=1.0).contains(&summary.training_accuracy));
        assert_eq!(summary.producer.name, ENGINE_NAME);
    }

    #[test]
    fn test_predict_at_hour_after_training() {
        let (predictor, _) = train_from_log(SAMPLE_LOG, Some(7)).unwrap();

        let monday = NaiveDate::from_ymd_opt(2020, 3, 23).unwrap();
        let prediction = predictor.predict_at_hour(monday, 10).unwrap();

        assert_eq!(prediction.date, monday);
        assert_eq!(prediction.weekday, "Mon");
        assert_eq!(prediction.hour, 10);
    }

    #[test]
    fn test_predict_clock_time_variant() {
        let (predictor, _) = train_from_log(SAMPLE_LOG, Some(7)).unwrap();

        let date = NaiveDate::from_ymd_opt(2020, 3, 24).unwrap();
        let time = TimeOfDay { hour: 14, minute: 0 };
        let prediction = predictor.predict(date, &time).unwrap();
        assert_eq!(prediction.hour, 14);
    }

    #[test]
    fn test_predict_before_training_is_an_error() {
        let predictor = Predictor::new();
        let date = NaiveDate::from_ymd_opt(2020, 3, 23).unwrap();
        assert!(matches!(
            predictor.predict_at_hour(date, 10),
            Err(PipelineError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_training_fails_on_single_distinct_date() {
        let result = train_from_log("2020-3-2 AM 9:05,Mon,in\n", Some(1));
        assert!(matches!(result, Err(PipelineError::InsufficientDates(1))));
    }

    #[test]
    fn test_prediction_json_shape() {
        let (predictor, _) = train_from_log(SAMPLE_LOG, Some(7)).unwrap();
        let date = NaiveDate::from_ymd_opt(2020, 3, 23).unwrap();
        let prediction = predictor.predict_at_hour(date, 10).unwrap();

        let value = serde_json::to_value(&prediction).unwrap();
        assert_eq!(value["producer"]["name"], "attendance-oracle");
        assert_eq!(value["producer"]["version"], ENGINE_VERSION);
        assert_eq!(value["date"], "2020-03-23");
        assert!(value["present"].is_boolean());
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        let (predictor_a, _) = train_from_log(SAMPLE_LOG, Some(99)).unwrap();
        let (predictor_b, _) = train_from_log(SAMPLE_LOG, Some(99)).unwrap();

        let date = NaiveDate::from_ymd_opt(2020, 3, 25).unwrap();
        for hour in 9..=18 {
            assert_eq!(
                predictor_a.predict_at_hour(date, hour).unwrap().present,
                predictor_b.predict_at_hour(date, hour).unwrap().present
            );
        }
    }
}
