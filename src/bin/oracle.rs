//! Oracle CLI - Command-line interface for the attendance predictor
//!
//! Commands:
//! - predict: Train on a log and predict presence for a date and hour
//! - dataset: Export the synthesized labeled training set
//! - validate: Check a raw log line by line

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use attendance_oracle::calendar::WorkingHours;
use attendance_oracle::parser;
use attendance_oracle::pipeline::{Prediction, Predictor, PredictorConfig, TrainingSummary};
use attendance_oracle::training::TrainingSetBuilder;
use attendance_oracle::{PipelineError, ENGINE_VERSION};
use chrono::{Datelike, Local};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Oracle - office-attendance prediction from check-in logs
#[derive(Parser)]
#[command(name = "oracle")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Predict office attendance from check-in logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on a log and predict presence for a date and hour
    Predict {
        /// Attendance log path (use - for stdin)
        #[arg(short, long)]
        log: PathBuf,

        /// Date to predict, as YYYY-M-D (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Hour to predict; prompted for interactively when omitted
        #[arg(long)]
        hour: Option<u32>,

        /// Seed for negative sampling and shuffling
        #[arg(long)]
        seed: Option<u64>,

        /// Negative examples per missing date
        #[arg(long, default_value = "1")]
        sample_size: usize,

        /// Working window start hour
        #[arg(long, default_value = "9")]
        window_start: u32,

        /// Working window end hour
        #[arg(long, default_value = "18")]
        window_end: u32,

        /// Adjacency lookback in days
        #[arg(long, default_value = "4")]
        adjacency_days: i64,

        /// Output the prediction and training summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the synthesized labeled training set
    Dataset {
        /// Attendance log path (use - for stdin)
        #[arg(short, long)]
        log: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        format: OutputFormat,

        /// Seed for negative sampling and shuffling
        #[arg(long)]
        seed: Option<u64>,

        /// Negative examples per missing date
        #[arg(long, default_value = "1")]
        sample_size: usize,

        /// Working window start hour
        #[arg(long, default_value = "9")]
        window_start: u32,

        /// Working window end hour
        #[arg(long, default_value = "18")]
        window_end: u32,

        /// Adjacency lookback in days
        #[arg(long, default_value = "4")]
        adjacency_days: i64,
    },

    /// Check a raw log line by line
    Validate {
        /// Attendance log path (use - for stdin)
        #[arg(short, long)]
        log: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one labeled row per line)
    Ndjson,
    /// JSON document with feature names and rows
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), OracleCliError> {
    match cli.command {
        Commands::Predict {
            log,
            date,
            hour,
            seed,
            sample_size,
            window_start,
            window_end,
            adjacency_days,
            json,
        } => cmd_predict(
            &log,
            date.as_deref(),
            hour,
            seed,
            sample_size,
            window_start,
            window_end,
            adjacency_days,
            json,
        ),

        Commands::Dataset {
            log,
            output,
            format,
            seed,
            sample_size,
            window_start,
            window_end,
            adjacency_days,
        } => cmd_dataset(
            &log,
            &output,
            format,
            seed,
            sample_size,
            window_start,
            window_end,
            adjacency_days,
        ),

        Commands::Validate { log, json } => cmd_validate(&log, json),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_predict(
    log: &Path,
    date: Option<&str>,
    hour: Option<u32>,
    seed: Option<u64>,
    sample_size: usize,
    window_start: u32,
    window_end: u32,
    adjacency_days: i64,
    json: bool,
) -> Result<(), OracleCliError> {
    let log_text = read_input(log)?;
    let working_hours = WorkingHours::new(window_start, window_end)?;

    let mut predictor = Predictor::with_config(PredictorConfig {
        working_hours,
        adjacency_window_days: adjacency_days,
        sample_size,
        shuffle: true,
        seed,
    });
    let summary = predictor.train(&log_text)?;

    let date = match date {
        Some(token) => parser::parse_date_token(token)?,
        None => Local::now().date_naive(),
    };

    let hour = match hour {
        Some(hour) => hour,
        None if atty::is(atty::Stream::Stdin) => prompt_for_hour(&working_hours)?,
        None => return Err(OracleCliError::HourRequired),
    };

    let prediction = predictor.predict_at_hour(date, hour)?;

    if json {
        let report = PredictReport {
            summary,
            prediction,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Prediction");
        println!("==========");
        println!(
            "Date:     {}-{}-{} ({})",
            prediction.date.year(),
            prediction.date.month(),
            prediction.date.day(),
            prediction.weekday
        );
        println!("Hour:     {}:00", prediction.hour);
        println!(
            "Verdict:  {}",
            if prediction.present {
                "they will be in the office"
            } else {
                "they will not be in the office"
            }
        );
        println!(
            "Training: {} records, {} positive / {} negative examples, accuracy {:.2}",
            summary.records,
            summary.positive_examples,
            summary.negative_examples,
            summary.training_accuracy
        );
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_dataset(
    log: &Path,
    output: &Path,
    format: OutputFormat,
    seed: Option<u64>,
    sample_size: usize,
    window_start: u32,
    window_end: u32,
    adjacency_days: i64,
) -> Result<(), OracleCliError> {
    let log_text = read_input(log)?;
    let working_hours = WorkingHours::new(window_start, window_end)?;

    let records = parser::parse_log(&log_text)?;
    let dates = parser::observed_dates(&log_text)?;

    let builder = TrainingSetBuilder::new()
        .with_working_hours(working_hours)
        .with_adjacency_window_days(adjacency_days)
        .with_sample_size(sample_size);

    let training_set = match seed {
        Some(seed) => builder.synthesize_seeded(&records, &dates, seed)?,
        None => {
            let mut rng = ChaCha8Rng::from_entropy();
            builder.synthesize(&records, &dates, &mut rng)?
        }
    };

    let output_data = match format {
        OutputFormat::Ndjson => training_set.to_ndjson()?,
        OutputFormat::Json => training_set.to_json(false)?,
        OutputFormat::JsonPretty => training_set.to_json(true)?,
    };

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(log: &Path, json: bool) -> Result<(), OracleCliError> {
    let log_text = read_input(log)?;
    let report = parser::validate_log(&log_text);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total lines:    {}", report.total_lines);
        println!("Ignored lines:  {}", report.ignored_lines);
        println!("Valid records:  {}", report.valid_records);
        println!("Invalid lines:  {}", report.errors.len());

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Line {}: {}", err.line_number, err.error);
            }
        }
    }

    if report.errors.is_empty() {
        Ok(())
    } else {
        Err(OracleCliError::ValidationFailed(report.errors.len()))
    }
}

// Helper functions

fn read_input(path: &Path) -> Result<String, OracleCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn prompt_for_hour(working_hours: &WorkingHours) -> Result<u32, OracleCliError> {
    print!(
        "Which hour are you asking about? [{}, {}]: ",
        working_hours.start_hour(),
        working_hours.end_hour()
    );
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let trimmed = line.trim();

    trimmed
        .parse::<u32>()
        .map_err(|_| OracleCliError::InvalidHourInput(trimmed.to_string()))
}

// Error types

#[derive(Debug)]
enum OracleCliError {
    Io(io::Error),
    Pipeline(PipelineError),
    Json(serde_json::Error),
    HourRequired,
    InvalidHourInput(String),
    ValidationFailed(usize),
}

impl From<io::Error> for OracleCliError {
    fn from(e: io::Error) -> Self {
        OracleCliError::Io(e)
    }
}

impl From<PipelineError> for OracleCliError {
    fn from(e: PipelineError) -> Self {
        OracleCliError::Pipeline(e)
    }
}

impl From<serde_json::Error> for OracleCliError {
    fn from(e: serde_json::Error) -> Self {
        OracleCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<OracleCliError> for CliError {
    fn from(e: OracleCliError) -> Self {
        match e {
            OracleCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            OracleCliError::Pipeline(e) => CliError {
                code: "PIPELINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'oracle validate' to inspect the log".to_string()),
            },
            OracleCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            OracleCliError::HourRequired => CliError {
                code: "HOUR_REQUIRED".to_string(),
                message: "No hour given and stdin is not interactive".to_string(),
                hint: Some("Pass --hour or run from a terminal".to_string()),
            },
            OracleCliError::InvalidHourInput(input) => CliError {
                code: "INVALID_HOUR".to_string(),
                message: format!("Not an hour: {}", input),
                hint: Some("Enter a whole hour, e.g. 14".to_string()),
            },
            OracleCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} lines failed validation", count),
                hint: Some("Fix the reported lines and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct PredictReport {
    summary: TrainingSummary,
    prediction: Prediction,
}
