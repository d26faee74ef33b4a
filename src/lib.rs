//! Attendance Oracle - predicts office presence from historical check-in logs
//!
//! The core is a feature-synthesis and training-set-construction pipeline:
//! raw timestamped attendance lines are parsed, encoded into fixed-order
//! 14-dimensional feature vectors, and paired with synthesized absence
//! examples so a binary classifier can learn when the person shows up.
//!
//! ## Modules
//!
//! - **calendar**: season/weekday one-hot encodings and time normalization
//! - **adjacency**: trailing-window recency score over known dates
//! - **features**: fixed-order feature vector assembly
//! - **parser**: raw log line parsing and validation
//! - **training**: positive/negative example synthesis with seeded sampling
//! - **model**: the `Classifier` seam and the bundled decision tree
//! - **pipeline**: log-to-predictor orchestration

pub mod adjacency;
pub mod calendar;
pub mod error;
pub mod features;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod training;

pub use error::PipelineError;
pub use parser::AttendanceRecord;
pub use pipeline::{train_from_log, Prediction, Predictor, PredictorConfig, TrainingSummary};
pub use training::{Label, TrainingSet, TrainingSetBuilder};

/// Engine version embedded in summaries and predictions
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for summaries and predictions
pub const ENGINE_NAME: &str = "attendance-oracle";
