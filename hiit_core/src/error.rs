//! Error types for the hiit_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for hiit_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Transport or status error talking to the plan endpoint
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source record could not be turned into an exercise
    #[error("Plan format error in record {record}: {reason}")]
    PlanFormat { record: usize, reason: String },

    /// No plans are loaded; carries the last load failure if there was one
    #[error("Workouts are not loaded{}", .0.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
    NotLoaded(Option<String>),

    /// The requested phase/day has no plan
    #[error("Workout for {phase} / day {day} is not available")]
    Unavailable { phase: String, day: String },

    /// The engine reached a state with no valid current exercise
    #[error("Progression error: {0}")]
    Progression(String),

    /// Circuit count outside the configured bounds
    #[error("Invalid circuit count {value} (allowed {min}-{max})")]
    InvalidCircuits { value: u32, min: u32, max: u32 },

    /// The session was aborted or already finished
    #[error("Session has ended")]
    SessionEnded,

    /// The edit sink rejected or failed to store an update
    #[error("Save failed: {message}. {remediation}")]
    Save { message: String, remediation: String },

    /// Editing is switched off in the configuration
    #[error("Editing is disabled (set features.editing = true to enable)")]
    EditingDisabled,

    /// Generic error
    #[error("{0}")]
    Other(String),
}
