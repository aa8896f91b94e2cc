//! Workout progression engine.
//!
//! Pure traversal rules over a flat exercise list with an optional repeating
//! main block:
//! - Finish every set of an exercise before moving on
//! - After the last exercise of the circuit range, jump back to its start
//!   until the requested number of circuits is done
//! - Report which kind of rest the caller should run between steps
//!
//! Timers and timestamps live in [`crate::session`]; nothing here reads the
//! clock.

use crate::{
    CircuitRange, Error, Exercise, ItemMark, ProgressionState, RestKind, Result, Transition,
    WorkoutPlan,
};
use std::sync::Arc;

/// Locate the repeating block: first through last exercise typed "main".
///
/// Without any main exercise the whole plan is the block. Exercises of other
/// types that sit between two main exercises are part of the block.
pub fn detect_circuit(exercises: &[Exercise]) -> Option<CircuitRange> {
    if exercises.is_empty() {
        return None;
    }

    let first = exercises.iter().position(Exercise::is_main);
    let last = exercises.iter().rposition(Exercise::is_main);

    match (first, last) {
        (Some(start), Some(end)) => Some(CircuitRange { start, end }),
        _ => Some(CircuitRange {
            start: 0,
            end: exercises.len() - 1,
        }),
    }
}

impl ProgressionState {
    /// Fresh state for a plan, positioned on the preview of the first exercise
    pub fn start(plan: Arc<WorkoutPlan>, total_circuits: u32) -> Self {
        let circuit = detect_circuit(&plan.exercises);
        tracing::debug!(
            "Starting '{}' with {} exercises, circuit range {:?}, {} circuits",
            plan.title,
            plan.exercises.len(),
            circuit,
            total_circuits
        );

        Self {
            plan,
            circuit,
            exercise_index: 0,
            set_number: 1,
            circuit_number: 1,
            total_circuits: total_circuits.max(1),
            is_resting: false,
            started: false,
        }
    }

    /// Leave the preview. Returns false if the workout was already started.
    pub fn begin(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        true
    }

    pub fn is_complete(&self) -> bool {
        self.exercise_index >= self.exercises().len()
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.exercises().get(self.exercise_index)
    }

    /// Step past the current set.
    ///
    /// Returns an error when there is no current exercise; callers treat
    /// that as fatal for the session.
    pub fn advance(&mut self) -> Result<Transition> {
        let sets = match self.current_exercise() {
            Some(exercise) => exercise.sets,
            None => {
                return Err(Error::Progression(format!(
                    "exercise index {} is out of range for {} exercises",
                    self.exercise_index,
                    self.exercises().len()
                )))
            }
        };

        if self.set_number < sets {
            self.set_number += 1;
            self.is_resting = true;
            tracing::debug!(
                "Set {}/{} of exercise {}",
                self.set_number,
                sets,
                self.exercise_index
            );
            return Ok(Transition::NextSet {
                rest: RestKind::Short,
            });
        }

        self.set_number = 1;
        self.exercise_index += 1;

        if let Some(range) = self.circuit {
            if self.exercise_index > range.end && self.circuit_number < self.total_circuits {
                self.circuit_number += 1;
                self.exercise_index = range.start;
                self.is_resting = true;
                tracing::debug!(
                    "Circuit {}/{} begins at exercise {}",
                    self.circuit_number,
                    self.total_circuits,
                    range.start
                );
                return Ok(Transition::NextCircuit {
                    circuit: self.circuit_number,
                    rest: RestKind::Long,
                });
            }
        }

        if self.is_complete() {
            self.is_resting = false;
            tracing::debug!("All exercises done");
            return Ok(Transition::Completed);
        }

        self.is_resting = true;
        tracing::debug!("Next exercise {}", self.exercise_index);
        Ok(Transition::NextExercise {
            rest: RestKind::Short,
        })
    }

    /// End of a rest period, whether it ran out or was skipped
    pub fn finish_rest(&mut self) {
        self.is_resting = false;
    }

    /// Change the circuit count; only future circuit boundaries see it
    pub fn set_total_circuits(&mut self, total: u32) {
        self.total_circuits = total.max(1);
    }

    /// Fraction of the current pass done, for the progress ring
    pub fn progress_fraction(&self) -> f64 {
        if !self.started {
            return 0.0;
        }
        let len = self.exercises().len();
        if len == 0 {
            return 1.0;
        }

        let sets = self.current_exercise().map(|e| e.sets).unwrap_or(1).max(1);
        let within = (self.set_number.saturating_sub(1)) as f64 / sets as f64;
        let fraction = (self.exercise_index as f64 + within) / len as f64;
        fraction.clamp(0.0, 1.0)
    }

    /// Completed/current/upcoming marker for each exercise in the list
    pub fn exercise_marks(&self) -> Vec<ItemMark> {
        (0..self.exercises().len())
            .map(|i| {
                if i == self.exercise_index {
                    ItemMark::Current
                } else if i < self.exercise_index {
                    ItemMark::Completed
                } else {
                    ItemMark::Upcoming
                }
            })
            .collect()
    }

    /// One flag per planned circuit, set for circuits already finished
    pub fn circuit_marks(&self) -> Vec<bool> {
        (1..=self.total_circuits)
            .map(|i| i < self.circuit_number)
            .collect()
    }
}
