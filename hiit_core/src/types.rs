//! Core domain types for the hiit workout system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and workout plans as loaded from the plan source
//! - Day keys that unify weekday names and day numbers
//! - Progression state and the transitions the engine reports
//! - Wire types for the edit endpoint

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Plan Types
// ============================================================================

/// A single exercise line from a workout plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    /// Free-text category ("warmup", "main", "finisher", ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    /// Reps or duration text, e.g. "10 reps" or "30s hold"
    pub details: String,
    pub sets: u32,
}

impl Exercise {
    pub fn new(kind: impl Into<String>, name: impl Into<String>, details: impl Into<String>, sets: u32) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            details: details.into(),
            sets: sets.max(1),
        }
    }

    /// Whether this exercise belongs to the repeating main block
    pub fn is_main(&self) -> bool {
        self.kind.eq_ignore_ascii_case("main")
    }
}

/// One day's workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutPlan {
    pub title: String,
    pub exercises: Vec<Exercise>,
}

/// Identifier of a day within a phase.
///
/// Weekday names and numbers share one key space: "Monday" and `1` are the
/// same day. Anything else is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayKey {
    Number(u32),
    Named(String),
}

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

impl DayKey {
    /// Parse a day identifier. Returns None for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Ok(n) = trimmed.parse::<u32>() {
            return Some(DayKey::Number(n));
        }

        let lower = trimmed.to_lowercase();
        if let Some(pos) = WEEKDAYS.iter().position(|d| *d == lower) {
            return Some(DayKey::Number(pos as u32 + 1));
        }

        Some(DayKey::Named(trimmed.to_string()))
    }

    /// Weekday name for numbered days 1-7
    pub fn weekday_name(&self) -> Option<&'static str> {
        match self {
            DayKey::Number(n @ 1..=7) => Some(
                ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
                    [*n as usize - 1],
            ),
            _ => None,
        }
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayKey::Number(n) => write!(f, "{}", n),
            DayKey::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Inclusive index range of the repeating block within a plan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitRange {
    pub start: usize,
    pub end: usize,
}

impl CircuitRange {
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }
}

// ============================================================================
// Progression Types
// ============================================================================

/// Traversal state of one workout.
///
/// `exercise_index == exercises.len()` means the workout is complete.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressionState {
    pub plan: Arc<WorkoutPlan>,
    pub circuit: Option<CircuitRange>,
    pub exercise_index: usize,
    pub set_number: u32,
    pub circuit_number: u32,
    pub total_circuits: u32,
    pub is_resting: bool,
    pub started: bool,
}

impl ProgressionState {
    pub fn exercises(&self) -> &[Exercise] {
        &self.plan.exercises
    }
}

/// Length of a rest period
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestKind {
    /// Between sets and between exercises
    Short,
    /// Between circuits
    Long,
}

/// What `advance` did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Same exercise, next set
    NextSet { rest: RestKind },
    /// Next exercise in the list
    NextExercise { rest: RestKind },
    /// Back to the start of the circuit range
    NextCircuit { circuit: u32, rest: RestKind },
    /// Past the last exercise
    Completed,
}

/// Display sub-state of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Preview,
    Active,
    Resting,
    Completed,
}

/// Per-item marker for the exercise list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemMark {
    Completed,
    Current,
    Upcoming,
}

// ============================================================================
// Edit Endpoint Types
// ============================================================================

/// Exercise as sent to the edit endpoint (sets are not editable there)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseEdit {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub details: String,
}

impl From<&Exercise> for ExerciseEdit {
    fn from(ex: &Exercise) -> Self {
        Self {
            kind: ex.kind.clone(),
            name: ex.name.clone(),
            details: ex.details.clone(),
        }
    }
}

/// Body of the `updateDayWorkout` POST
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateDayRequest {
    pub action: String,
    pub day: DayKey,
    pub exercises: Vec<ExerciseEdit>,
}

impl UpdateDayRequest {
    pub const ACTION: &'static str = "updateDayWorkout";

    pub fn new(day: DayKey, exercises: Vec<ExerciseEdit>) -> Self {
        Self {
            action: Self::ACTION.to_string(),
            day,
            exercises,
        }
    }
}

/// Reply from the edit endpoint
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_key_weekday_and_number_agree() {
        assert_eq!(DayKey::parse("Monday"), Some(DayKey::Number(1)));
        assert_eq!(DayKey::parse(" saturday "), Some(DayKey::Number(6)));
        assert_eq!(DayKey::parse("1"), DayKey::parse("MONDAY"));
        assert_eq!(DayKey::parse("Sunday"), Some(DayKey::Number(7)));
    }

    #[test]
    fn test_day_key_other_text_kept() {
        assert_eq!(
            DayKey::parse("Rest Day"),
            Some(DayKey::Named("Rest Day".into()))
        );
        assert_eq!(DayKey::parse("   "), None);
    }

    #[test]
    fn test_day_key_weekday_name() {
        assert_eq!(DayKey::Number(3).weekday_name(), Some("Wednesday"));
        assert_eq!(DayKey::Number(12).weekday_name(), None);
        assert_eq!(DayKey::Named("x".into()).weekday_name(), None);
    }

    #[test]
    fn test_is_main_case_insensitive() {
        assert!(Exercise::new("MAIN", "Burpee", "10 reps", 1).is_main());
        assert!(Exercise::new("Main", "Burpee", "10 reps", 1).is_main());
        // no trimming here; the loader trims cells
        assert!(!Exercise::new(" main ", "Burpee", "10 reps", 1).is_main());
        assert!(!Exercise::new("mainly", "Burpee", "10 reps", 1).is_main());
    }

    #[test]
    fn test_exercise_sets_floor_at_one() {
        assert_eq!(Exercise::new("warmup", "Jog", "2 min", 0).sets, 1);
    }

    #[test]
    fn test_update_request_wire_shape() {
        let req = UpdateDayRequest::new(
            DayKey::Number(2),
            vec![ExerciseEdit {
                kind: "main".into(),
                name: "Squat".into(),
                details: "12 reps".into(),
            }],
        );
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["action"], "updateDayWorkout");
        assert_eq!(value["day"], 2);
        assert_eq!(value["exercises"][0]["type"], "main");
        assert_eq!(value["exercises"][0]["details"], "12 reps");
    }

    #[test]
    fn test_save_response_message_optional() {
        let resp: SaveResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(resp.success);
        assert!(resp.message.is_none());
    }
}
