//! Plan sources and the edit sink.
//!
//! The sheet endpoint answers a GET with a JSON array of rows and accepts a
//! POST that replaces one day's exercises. The same rows can also be read
//! from a JSON dump or a CSV export of the sheet.

use crate::plan::RawRecord;
use crate::{DayKey, Error, ExerciseEdit, Result, SaveResponse, UpdateDayRequest};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SAVE_REMEDIATION: &str = "Check that the sheet endpoint is deployed for anonymous access, \
that the day exists in the sheet, and try again. Nothing was changed locally.";

/// Anything that can produce the flat plan rows
pub trait PlanSource {
    fn fetch_records(&self) -> Result<Vec<RawRecord>>;

    /// Human readable location for messages
    fn describe(&self) -> String;
}

/// Accepts edited days
pub trait EditSink {
    /// Replace the exercises of `day`; returns the endpoint's message
    fn update_day(&self, day: &DayKey, exercises: &[ExerciseEdit]) -> Result<String>;
}

// ============================================================================
// HTTP endpoint
// ============================================================================

/// The spreadsheet script endpoint
pub struct HttpSource {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

impl PlanSource for HttpSource {
    fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        tracing::info!("Fetching workouts from {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send()?.error_for_status()?;
        let records = response.json::<Vec<RawRecord>>()?;
        tracing::debug!("Received {} records", records.len());
        Ok(records)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

impl EditSink for HttpSource {
    fn update_day(&self, day: &DayKey, exercises: &[ExerciseEdit]) -> Result<String> {
        let request = UpdateDayRequest::new(day.clone(), exercises.to_vec());
        tracing::info!(
            "Posting {} exercises for day {} to {}",
            exercises.len(),
            day,
            self.endpoint
        );

        let reply = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<SaveResponse>())
            .map_err(|e| save_error(e.to_string()))?;

        interpret_save_response(reply)
    }
}

/// Turn the endpoint's reply into the user-facing outcome
pub fn interpret_save_response(reply: SaveResponse) -> Result<String> {
    if reply.success {
        Ok(reply
            .message
            .unwrap_or_else(|| "Workout updated".to_string()))
    } else {
        Err(save_error(
            reply
                .message
                .unwrap_or_else(|| "the endpoint reported a failure".to_string()),
        ))
    }
}

fn save_error(message: String) -> Error {
    tracing::warn!("Save failed: {}", message);
    Error::Save {
        message,
        remediation: SAVE_REMEDIATION.to_string(),
    }
}

// ============================================================================
// File sources
// ============================================================================

/// A JSON array of rows on disk, same shape as the endpoint returns
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PlanSource for JsonFileSource {
    fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        let contents = std::fs::read_to_string(&self.path)?;
        let records: Vec<RawRecord> = serde_json::from_str(&contents)?;
        tracing::info!("Loaded {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// CSV export of the sheet, header row included
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// CSV row format; every cell arrives as text
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    week: Option<String>,
    #[serde(default)]
    day: Option<String>,
    #[serde(default, rename = "day name")]
    day_name: Option<String>,
    #[serde(default, rename = "exercise type")]
    exercise_type: Option<String>,
    #[serde(default, rename = "exercise name")]
    exercise_name: Option<String>,
    #[serde(default, rename = "reps/time")]
    reps_time: Option<String>,
    #[serde(default)]
    sets: Option<String>,
}

impl From<CsvRow> for RawRecord {
    fn from(row: CsvRow) -> Self {
        let text = |cell: Option<String>| cell.map(Value::String);
        RawRecord {
            week: text(row.week),
            day: text(row.day),
            day_name: text(row.day_name),
            exercise_type: text(row.exercise_type),
            exercise_name: text(row.exercise_name),
            reps_time: text(row.reps_time),
            sets: text(row.sets),
        }
    }
}

impl PlanSource for CsvFileSource {
    fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut records = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            records.push(RawRecord::from(row?));
        }
        tracing::info!("Loaded {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Pick a source for a URL or file path
pub fn open_source(location: &str, timeout: Duration) -> Result<Box<dyn PlanSource>> {
    if is_url(location) {
        return Ok(Box::new(HttpSource::new(location, timeout)?));
    }

    let path = Path::new(location);
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        Ok(Box::new(CsvFileSource::new(path)))
    } else {
        Ok(Box::new(JsonFileSource::new(path)))
    }
}

/// Edits can only go to the live endpoint
pub fn open_edit_sink(location: &str, timeout: Duration) -> Result<HttpSource> {
    if !is_url(location) {
        return Err(Error::Config(format!(
            "edits need an http(s) endpoint, got '{}'",
            location
        )));
    }
    HttpSource::new(location, timeout)
}

/// Read an edited exercise list (`[{type, name, details}]`) from disk
pub fn read_edit_file(path: &Path) -> Result<Vec<ExerciseEdit>> {
    let contents = std::fs::read_to_string(path)?;
    let exercises: Vec<ExerciseEdit> = serde_json::from_str(&contents)?;
    if exercises.is_empty() {
        return Err(Error::Other(format!("{:?} contains no exercises", path)));
    }
    Ok(exercises)
}
