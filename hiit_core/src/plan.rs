//! Turning flat spreadsheet records into workout plans.
//!
//! The plan source hands back one record per exercise row. Rows are grouped
//! by phase (the optional `week` column) and then by day, keeping row order
//! as exercise order. Required columns are checked here so nothing
//! downstream sees a half-filled exercise.

use crate::{DayKey, Error, Exercise, Result, WorkoutPlan};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One row as delivered by the plan source.
///
/// Cells are kept as loose JSON values because the sheet endpoint sends
/// numbers for some columns and strings for others.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub week: Option<Value>,
    #[serde(default)]
    pub day: Option<Value>,
    #[serde(default, rename = "day name")]
    pub day_name: Option<Value>,
    #[serde(default, rename = "exercise type")]
    pub exercise_type: Option<Value>,
    #[serde(default, rename = "exercise name")]
    pub exercise_name: Option<Value>,
    #[serde(default, rename = "reps/time")]
    pub reps_time: Option<Value>,
    #[serde(default)]
    pub sets: Option<Value>,
}

/// Days of one phase. `name` is None when the source has no phase column.
#[derive(Clone, Debug, Default)]
pub struct Phase {
    pub name: Option<String>,
    pub days: BTreeMap<DayKey, Arc<WorkoutPlan>>,
}

/// Every plan from one load, in source order of first appearance
#[derive(Clone, Debug, Default)]
pub struct WorkoutLibrary {
    pub phases: Vec<Phase>,
}

impl WorkoutLibrary {
    pub fn is_empty(&self) -> bool {
        self.phases.iter().all(|p| p.days.is_empty())
    }

    pub fn phase(&self, name: Option<&str>) -> Option<&Phase> {
        self.phases
            .iter()
            .find(|p| p.name.as_deref().map(str::trim) == name.map(str::trim))
    }

    pub fn phase_names(&self) -> Vec<Option<&str>> {
        self.phases.iter().map(|p| p.name.as_deref()).collect()
    }

    /// Plan for a phase/day pair
    pub fn plan(&self, phase: Option<&str>, day: &DayKey) -> Option<Arc<WorkoutPlan>> {
        self.phase(phase).and_then(|p| p.days.get(day)).cloned()
    }

    /// Pick the phase to use when the caller did not name one.
    ///
    /// Prefers `preferred` when it exists, then the only phase if there is
    /// exactly one, then the unphased bucket.
    pub fn resolve_phase<'a>(&'a self, requested: Option<&'a str>, preferred: &'a str) -> Option<&'a str> {
        if requested.is_some() {
            return requested;
        }
        if self.phase(Some(preferred)).is_some() {
            return Some(preferred);
        }
        match self.phases.as_slice() {
            [only] => only.name.as_deref(),
            _ => None,
        }
    }
}

/// Group records into a library.
///
/// When `use_phases` is false the week column is ignored and every day lands
/// in a single unnamed phase.
pub fn build_library(records: &[RawRecord], use_phases: bool) -> Result<WorkoutLibrary> {
    let mut phases: Vec<(Option<String>, BTreeMap<DayKey, WorkoutPlan>)> = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        let row = idx + 1;

        let day_text = cell_text(&record.day).ok_or_else(|| missing(row, "day"))?;
        let day = DayKey::parse(&day_text).ok_or_else(|| missing(row, "day"))?;
        let exercise = parse_exercise(record, row)?;

        let phase_name = if use_phases {
            cell_text(&record.week)
        } else {
            None
        };

        let slot = match phases.iter().position(|(name, _)| *name == phase_name) {
            Some(pos) => pos,
            None => {
                phases.push((phase_name, BTreeMap::new()));
                phases.len() - 1
            }
        };

        phases[slot]
            .1
            .entry(day.clone())
            .or_insert_with(|| WorkoutPlan {
                title: cell_text(&record.day_name).unwrap_or_else(|| default_title(&day)),
                exercises: Vec::new(),
            })
            .exercises
            .push(exercise);
    }

    let phases = phases
        .into_iter()
        .map(|(name, days)| {
            for (day, plan) in &days {
                if !main_block_is_contiguous(&plan.exercises) {
                    tracing::warn!(
                        "Main exercises for {:?} / day {} are not contiguous; the circuit will include everything between the first and last main exercise",
                        name,
                        day
                    );
                }
            }
            Phase {
                name,
                days: days.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
            }
        })
        .collect::<Vec<_>>();

    let plan_count: usize = phases.iter().map(|p| p.days.len()).sum();
    tracing::info!(
        "Built {} plans across {} phases from {} records",
        plan_count,
        phases.len(),
        records.len()
    );

    Ok(WorkoutLibrary { phases })
}

fn parse_exercise(record: &RawRecord, row: usize) -> Result<Exercise> {
    let kind = cell_text(&record.exercise_type).ok_or_else(|| missing(row, "exercise type"))?;
    let name = cell_text(&record.exercise_name).ok_or_else(|| missing(row, "exercise name"))?;
    let details = cell_text(&record.reps_time).unwrap_or_default();
    let sets = cell_text(&record.sets)
        .and_then(|s| leading_integer(&s))
        .unwrap_or(1);

    Ok(Exercise::new(kind, name, details, sets))
}

fn missing(record: usize, field: &str) -> Error {
    Error::PlanFormat {
        record,
        reason: format!("missing required field '{}'", field),
    }
}

fn default_title(day: &DayKey) -> String {
    match day.weekday_name() {
        Some(name) => name.to_string(),
        None => format!("Day {}", day),
    }
}

/// Text content of a cell; blank and null cells are None
pub fn cell_text(value: &Option<Value>) -> Option<String> {
    let text = match value.as_ref()? {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Leading run of digits, e.g. "3 sets" -> 3. Zero is treated as absent.
fn leading_integer(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().ok().filter(|n| *n >= 1)
}

/// True when all "main" exercises sit next to each other
pub fn main_block_is_contiguous(exercises: &[Exercise]) -> bool {
    let first = exercises.iter().position(Exercise::is_main);
    let last = exercises.iter().rposition(Exercise::is_main);
    match (first, last) {
        (Some(a), Some(b)) => exercises[a..=b].iter().all(Exercise::is_main),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<RawRecord> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_groups_by_phase_then_day_in_order() {
        let recs = records(json!([
            {"week": "Week 1-2", "day": "Monday", "day name": "Legs", "exercise type": "warmup", "exercise name": "Jog", "reps/time": "60s"},
            {"week": "Week 1-2", "day": "Monday", "exercise type": "main", "exercise name": "Squat", "reps/time": "12 reps", "sets": 3},
            {"week": "Week 3-4", "day": 1, "day name": "Legs II", "exercise type": "main", "exercise name": "Lunge", "reps/time": "10 reps"},
            {"week": "Week 1-2", "day": 2, "day name": "Push", "exercise type": "main", "exercise name": "Push-up", "reps/time": 15},
        ]));

        let lib = build_library(&recs, true).unwrap();
        assert_eq!(lib.phase_names(), vec![Some("Week 1-2"), Some("Week 3-4")]);

        let monday = lib.plan(Some("Week 1-2"), &DayKey::Number(1)).unwrap();
        assert_eq!(monday.title, "Legs");
        let names: Vec<_> = monday.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Jog", "Squat"]);
        assert_eq!(monday.exercises[1].sets, 3);

        let tuesday = lib.plan(Some("Week 1-2"), &DayKey::Number(2)).unwrap();
        assert_eq!(tuesday.exercises[0].details, "15");

        let later = lib.plan(Some("Week 3-4"), &DayKey::Number(1)).unwrap();
        assert_eq!(later.title, "Legs II");
    }

    #[test]
    fn test_weekday_name_and_number_share_a_day() {
        let recs = records(json!([
            {"day": "Wednesday", "exercise type": "main", "exercise name": "A"},
            {"day": 3, "exercise type": "main", "exercise name": "B"},
            {"day": "3", "exercise type": "main", "exercise name": "C"},
        ]));
        let lib = build_library(&recs, true).unwrap();
        let plan = lib.plan(None, &DayKey::Number(3)).unwrap();
        assert_eq!(plan.exercises.len(), 3);
        assert_eq!(plan.title, "Wednesday");
    }

    #[test]
    fn test_padded_type_cell_is_still_main() {
        let recs = records(json!([
            {"day": 1, "exercise type": " Main ", "exercise name": "Squat"},
        ]));
        let lib = build_library(&recs, false).unwrap();
        let plan = lib.plan(None, &DayKey::Number(1)).unwrap();
        assert_eq!(plan.exercises[0].kind, "Main");
        assert!(plan.exercises[0].is_main());
    }

    #[test]
    fn test_phases_disabled_ignores_week() {
        let recs = records(json!([
            {"week": "Week 1-2", "day": 1, "exercise type": "main", "exercise name": "A"},
            {"week": "Week 3-4", "day": 1, "exercise type": "main", "exercise name": "B"},
        ]));
        let lib = build_library(&recs, false).unwrap();
        assert_eq!(lib.phases.len(), 1);
        assert_eq!(lib.plan(None, &DayKey::Number(1)).unwrap().exercises.len(), 2);
    }

    #[test]
    fn test_sets_fallback_to_one() {
        let recs = records(json!([
            {"day": 1, "exercise type": "main", "exercise name": "A", "sets": "3 sets"},
            {"day": 1, "exercise type": "main", "exercise name": "B", "sets": "abc"},
            {"day": 1, "exercise type": "main", "exercise name": "C", "sets": 0},
            {"day": 1, "exercise type": "main", "exercise name": "D"},
            {"day": 1, "exercise type": "main", "exercise name": "E", "sets": 2.0},
        ]));
        let lib = build_library(&recs, true).unwrap();
        let sets: Vec<_> = lib
            .plan(None, &DayKey::Number(1))
            .unwrap()
            .exercises
            .iter()
            .map(|e| e.sets)
            .collect();
        assert_eq!(sets, vec![3, 1, 1, 1, 2]);
    }

    #[test]
    fn test_missing_required_field_fails_fast() {
        let recs = records(json!([
            {"day": 1, "exercise type": "main", "exercise name": "A"},
            {"day": 1, "exercise type": "main", "reps/time": "10 reps"},
        ]));
        match build_library(&recs, true) {
            Err(Error::PlanFormat { record, reason }) => {
                assert_eq!(record, 2);
                assert!(reason.contains("exercise name"));
            }
            other => panic!("expected plan format error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_day_fails_fast() {
        let recs = records(json!([
            {"day": "  ", "exercise type": "main", "exercise name": "A"},
        ]));
        assert!(matches!(
            build_library(&recs, true),
            Err(Error::PlanFormat { record: 1, .. })
        ));
    }

    #[test]
    fn test_resolve_phase() {
        let recs = records(json!([
            {"week": "Week 1-2", "day": 1, "exercise type": "main", "exercise name": "A"},
            {"week": "Week 3-4", "day": 1, "exercise type": "main", "exercise name": "B"},
        ]));
        let lib = build_library(&recs, true).unwrap();
        assert_eq!(lib.resolve_phase(None, "Week 3-4"), Some("Week 3-4"));
        assert_eq!(lib.resolve_phase(Some("Week 1-2"), "Week 3-4"), Some("Week 1-2"));
        assert_eq!(lib.resolve_phase(None, "Week 9"), None);

        let single = build_library(&recs[..1], true).unwrap();
        assert_eq!(single.resolve_phase(None, "Week 9"), Some("Week 1-2"));
    }

    #[test]
    fn test_main_block_contiguity() {
        let ex = |kind: &str| Exercise::new(kind, "x", "", 1);
        assert!(main_block_is_contiguous(&[ex("warmup"), ex("main"), ex("main"), ex("cooldown")]));
        assert!(main_block_is_contiguous(&[ex("warmup")]));
        assert!(!main_block_is_contiguous(&[ex("main"), ex("warmup"), ex("main")]));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Some(json!("  hi "))), Some("hi".into()));
        assert_eq!(cell_text(&Some(json!(12))), Some("12".into()));
        assert_eq!(cell_text(&Some(json!(1.5))), Some("1.5".into()));
        assert_eq!(cell_text(&Some(Value::Null)), None);
        assert_eq!(cell_text(&Some(json!(""))), None);
        assert_eq!(cell_text(&None), None);
    }
}
