//! A workout session: progression state plus the things around it.
//!
//! The session owns the engine state, the one running countdown, the start
//! and finish timestamps, and the feature switches that decide whether rests
//! and timed exercises happen at all. Every method takes `now` explicitly so
//! elapsed times are reproducible in tests.

use crate::config::SessionConfig;
use crate::details::{self, Drive};
use crate::timer::{Countdown, TimerPurpose};
use crate::{
    Config, DayKey, Error, Exercise, ItemMark, ProgressionState, RestKind, Result,
    SessionStatus, Transition, WorkoutPlan,
};
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Knobs a session needs from the configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    /// Rest lengths and circuit bounds
    pub timing: SessionConfig,
    pub rest_enabled: bool,
    pub timed_exercises: bool,
}

impl SessionSettings {
    pub fn rest_for(&self, kind: RestKind) -> u32 {
        match kind {
            RestKind::Short => self.timing.rest_seconds,
            RestKind::Long => self.timing.long_rest_seconds(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            timing: config.session.clone(),
            rest_enabled: config.features.rest,
            timed_exercises: config.features.timed_exercises,
        }
    }
}

/// Something the front end should react to
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// The engine moved on; a rest may now be running
    Advanced(Transition),
    /// A rest ended, by expiry or skip
    RestFinished,
    /// The last exercise is done
    Completed(CompletionSummary),
}

/// Shown on the completion screen
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionSummary {
    pub session_id: Uuid,
    pub title: String,
    pub elapsed: Duration,
    pub circuits: u32,
}

impl CompletionSummary {
    /// Elapsed time as "Xm Ys"
    pub fn elapsed_text(&self) -> String {
        format_elapsed(self.elapsed)
    }
}

impl fmt::Display for CompletionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total workout time: {}", self.elapsed_text())
    }
}

/// Format a duration as whole minutes and rounded seconds
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.num_milliseconds().max(0);
    let total_secs = (millis + 500) / 1000;
    format!("{}m {}s", total_secs / 60, total_secs % 60)
}

pub struct WorkoutSession {
    id: Uuid,
    phase: Option<String>,
    day: DayKey,
    state: ProgressionState,
    settings: SessionSettings,
    timer: Option<Countdown>,
    started_at: Option<DateTime<Utc>>,
    summary: Option<CompletionSummary>,
    aborted: bool,
}

impl WorkoutSession {
    /// Start a workout on its preview screen
    pub fn new(
        plan: Arc<WorkoutPlan>,
        phase: Option<String>,
        day: DayKey,
        total_circuits: u32,
        settings: SessionSettings,
    ) -> Result<Self> {
        if plan.exercises.is_empty() {
            return Err(Error::Progression(format!(
                "plan '{}' has no exercises",
                plan.title
            )));
        }
        let total_circuits = settings.timing.check_circuits(total_circuits)?;

        let id = Uuid::new_v4();
        tracing::info!(
            "Session {} for '{}' ({:?} / day {}) with {} circuits",
            id,
            plan.title,
            phase,
            day,
            total_circuits
        );

        Ok(Self {
            id,
            phase,
            day,
            state: ProgressionState::start(plan, total_circuits),
            settings,
            timer: None,
            started_at: None,
            summary: None,
            aborted: false,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Option<&str> {
        self.phase.as_deref()
    }

    pub fn day(&self) -> &DayKey {
        &self.day
    }

    pub fn title(&self) -> &str {
        &self.state.plan.title
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn timer(&self) -> Option<&Countdown> {
        self.timer.as_ref()
    }

    pub fn timer_remaining(&self) -> Option<u32> {
        self.timer.as_ref().map(Countdown::remaining)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn summary(&self) -> Option<&CompletionSummary> {
        self.summary.as_ref()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn status(&self) -> SessionStatus {
        if self.summary.is_some() || self.state.is_complete() {
            SessionStatus::Completed
        } else if !self.state.started {
            SessionStatus::Preview
        } else if self.state.is_resting {
            SessionStatus::Resting
        } else {
            SessionStatus::Active
        }
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.state.current_exercise()
    }

    /// Exercise that follows the running rest; None means the finish
    pub fn up_next(&self) -> Option<&Exercise> {
        self.state.current_exercise()
    }

    /// How the current exercise is driven, honouring the timed-exercise switch
    pub fn current_drive(&self) -> Option<Drive> {
        let exercise = self.current_exercise()?;
        if !self.settings.timed_exercises {
            return Some(Drive::Reps);
        }
        Some(details::drive_for(&exercise.details))
    }

    pub fn progress_fraction(&self) -> f64 {
        self.state.progress_fraction()
    }

    pub fn exercise_marks(&self) -> Vec<ItemMark> {
        self.state.exercise_marks()
    }

    pub fn circuit_marks(&self) -> Vec<bool> {
        self.state.circuit_marks()
    }

    /// Leave the preview and start the clock. Returns false if already begun.
    pub fn begin(&mut self, now: DateTime<Utc>) -> Result<bool> {
        self.ensure_live()?;
        if !self.state.begin() {
            return Ok(false);
        }
        self.started_at = Some(now);
        tracing::info!("Session {} started", self.id);
        self.arm_exercise_timer();
        Ok(true)
    }

    /// The user finished the current set
    pub fn complete_set(&mut self, now: DateTime<Utc>) -> Result<SessionEvent> {
        self.ensure_live()?;
        if !self.state.started {
            return Err(Error::Other("workout has not been started".into()));
        }
        if self.state.is_resting {
            return Err(Error::Other("rest in progress; skip it first".into()));
        }
        self.advance(now)
    }

    /// One second passed. Fires the countdown's completion when it hits zero.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<Option<SessionEvent>> {
        self.ensure_live()?;
        let fired = match self.timer.as_mut() {
            Some(timer) => timer.tick(),
            None => false,
        };
        if fired {
            self.fire(now).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Cut the running countdown short; same effect as letting it expire
    pub fn skip(&mut self, now: DateTime<Utc>) -> Result<Option<SessionEvent>> {
        self.ensure_live()?;
        if self.timer.is_none() {
            return Ok(None);
        }
        self.fire(now).map(Some)
    }

    /// Change the number of circuits; takes effect at the next circuit boundary check
    pub fn set_total_circuits(&mut self, total: u32) -> Result<()> {
        let total = self.settings.timing.check_circuits(total)?;
        self.state.set_total_circuits(total);
        tracing::debug!("Session {} now runs {} circuits", self.id, total);
        Ok(())
    }

    /// Back to day selection. Cancels any countdown before the session is dropped.
    pub fn go_back(mut self) {
        if self.timer.take().is_some() {
            tracing::debug!("Cancelled pending countdown for session {}", self.id);
        }
        tracing::info!("Session {} closed", self.id);
    }

    fn ensure_live(&self) -> Result<()> {
        if self.aborted || self.summary.is_some() {
            return Err(Error::SessionEnded);
        }
        Ok(())
    }

    fn fire(&mut self, now: DateTime<Utc>) -> Result<SessionEvent> {
        let purpose = match self.timer.take() {
            Some(timer) => timer.purpose(),
            None => return Err(Error::Other("no countdown running".into())),
        };

        match purpose {
            TimerPurpose::Rest => {
                self.state.finish_rest();
                self.arm_exercise_timer();
                Ok(SessionEvent::RestFinished)
            }
            TimerPurpose::Exercise => self.advance(now),
        }
    }

    fn advance(&mut self, now: DateTime<Utc>) -> Result<SessionEvent> {
        self.timer = None;

        let transition = match self.state.advance() {
            Ok(t) => t,
            Err(e) => {
                self.aborted = true;
                tracing::error!("Aborting session {}: {}", self.id, e);
                return Err(e);
            }
        };

        match transition {
            Transition::Completed => {
                let summary = self.finish(now);
                Ok(SessionEvent::Completed(summary))
            }
            Transition::NextSet { rest }
            | Transition::NextExercise { rest }
            | Transition::NextCircuit { rest, .. } => {
                self.enter_rest(rest);
                Ok(SessionEvent::Advanced(transition))
            }
        }
    }

    fn enter_rest(&mut self, kind: RestKind) {
        let seconds = self.settings.rest_for(kind);
        if !self.settings.rest_enabled || seconds == 0 {
            self.state.finish_rest();
            self.arm_exercise_timer();
            return;
        }
        tracing::debug!("{:?} rest of {}s", kind, seconds);
        self.timer = Some(Countdown::new(TimerPurpose::Rest, seconds));
    }

    fn arm_exercise_timer(&mut self) {
        if !self.state.started || self.state.is_resting {
            return;
        }
        if let Some(Drive::Timed(seconds)) = self.current_drive() {
            self.timer = Some(Countdown::new(TimerPurpose::Exercise, seconds));
        }
    }

    fn finish(&mut self, now: DateTime<Utc>) -> CompletionSummary {
        let elapsed = self
            .started_at
            .map(|start| now - start)
            .unwrap_or_else(Duration::zero);
        let summary = CompletionSummary {
            session_id: self.id,
            title: self.state.plan.title.clone(),
            elapsed,
            circuits: self.state.circuit_number,
        };
        tracing::info!(
            "Session {} completed in {}",
            self.id,
            summary.elapsed_text()
        );
        self.summary = Some(summary.clone());
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 0, 0).unwrap()
    }

    fn plan(exercises: Vec<Exercise>) -> Arc<WorkoutPlan> {
        Arc::new(WorkoutPlan {
            title: "HIIT".into(),
            exercises,
        })
    }

    fn mixed_plan() -> Arc<WorkoutPlan> {
        plan(vec![
            Exercise::new("warmup", "Jumping Jacks", "30s", 1),
            Exercise::new("main", "Squat", "12 reps", 2),
            Exercise::new("main", "Plank", "20s hold", 1),
            Exercise::new("cooldown", "Stretch", "5 reps", 1),
        ])
    }

    fn session(total: u32) -> WorkoutSession {
        WorkoutSession::new(
            mixed_plan(),
            Some("Week 1-2".into()),
            DayKey::Number(1),
            total,
            SessionSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_preview_until_begin() {
        crate::logging::init_test();
        let mut s = session(1);
        assert_eq!(s.status(), SessionStatus::Preview);
        assert!(s.timer().is_none());
        assert!(s.complete_set(t0()).is_err());

        assert!(s.begin(t0()).unwrap());
        assert_eq!(s.status(), SessionStatus::Active);
        assert!(!s.begin(t0()).unwrap());
        assert_eq!(s.started_at(), Some(t0()));
    }

    #[test]
    fn test_timed_exercise_arms_countdown() {
        let mut s = session(1);
        s.begin(t0()).unwrap();
        let timer = s.timer().unwrap();
        assert_eq!(timer.purpose(), TimerPurpose::Exercise);
        assert_eq!(timer.remaining(), 30);
        assert_eq!(s.current_drive(), Some(Drive::Timed(30)));
    }

    #[test]
    fn test_countdown_expiry_advances_then_rests() {
        let mut s = session(1);
        s.begin(t0()).unwrap();
        for _ in 0..29 {
            assert_eq!(s.tick(t0()).unwrap(), None);
        }
        let event = s.tick(t0()).unwrap();
        assert_eq!(
            event,
            Some(SessionEvent::Advanced(Transition::NextExercise {
                rest: RestKind::Short
            }))
        );
        assert_eq!(s.status(), SessionStatus::Resting);
        assert_eq!(s.timer().unwrap().purpose(), TimerPurpose::Rest);
        assert_eq!(s.timer_remaining(), Some(15));
        assert_eq!(s.up_next().unwrap().name, "Squat");

        // rest expiry leaves the squat current; it is rep-based so no timer
        for _ in 0..15 {
            s.tick(t0()).unwrap();
        }
        assert_eq!(s.status(), SessionStatus::Active);
        assert!(s.timer().is_none());
        assert_eq!(s.current_exercise().unwrap().name, "Squat");
    }

    #[test]
    fn test_skip_equals_expiry() {
        let mut ticked = session(2);
        let mut skipped = session(2);
        ticked.begin(t0()).unwrap();
        skipped.begin(t0()).unwrap();

        // timed warmup
        while ticked.tick(t0()).unwrap().is_none() {}
        let skip_event = skipped.skip(t0()).unwrap();
        assert_eq!(ticked.state(), skipped.state());
        assert_eq!(ticked.timer(), skipped.timer());
        assert!(skip_event.is_some());

        // the rest that follows
        while ticked.tick(t0()).unwrap().is_none() {}
        assert_eq!(skipped.skip(t0()).unwrap(), Some(SessionEvent::RestFinished));
        assert_eq!(ticked.state(), skipped.state());
        assert_eq!(ticked.timer(), skipped.timer());
    }

    #[test]
    fn test_circuit_rest_is_long() {
        let mut s = session(2);
        s.begin(t0()).unwrap();
        s.skip(t0()).unwrap(); // warmup
        s.skip(t0()).unwrap(); // rest
        s.complete_set(t0()).unwrap(); // squat set 1
        s.skip(t0()).unwrap();
        s.complete_set(t0()).unwrap(); // squat set 2
        s.skip(t0()).unwrap();
        assert_eq!(s.current_exercise().unwrap().name, "Plank");
        let event = s.skip(t0()).unwrap(); // plank countdown
        assert_eq!(
            event,
            Some(SessionEvent::Advanced(Transition::NextCircuit {
                circuit: 2,
                rest: RestKind::Long
            }))
        );
        assert_eq!(s.timer_remaining(), Some(30));
        assert_eq!(s.circuit_marks(), vec![true, false]);
    }

    #[test]
    fn test_completion_records_elapsed() {
        let mut s = session(1);
        s.begin(t0()).unwrap();
        let end = t0() + Duration::seconds(125);
        let mut summary = None;
        for _ in 0..50 {
            let event = if s.timer().is_some() {
                s.skip(end).unwrap()
            } else {
                Some(s.complete_set(end).unwrap())
            };
            if let Some(SessionEvent::Completed(sum)) = event {
                summary = Some(sum);
                break;
            }
        }
        let summary = summary.expect("workout should complete");
        assert_eq!(summary.elapsed_text(), "2m 5s");
        assert_eq!(summary.to_string(), "Total workout time: 2m 5s");
        assert_eq!(s.status(), SessionStatus::Completed);
        assert!((s.progress_fraction() - 1.0).abs() < f64::EPSILON);
        assert!(matches!(s.complete_set(end), Err(Error::SessionEnded)));
    }

    #[test]
    fn test_rest_lengths_follow_config() {
        let mut config = Config::default();
        config.session.rest_seconds = 20;
        let settings = SessionSettings::from(&config);
        assert_eq!(settings.rest_for(RestKind::Short), 20);
        assert_eq!(settings.rest_for(RestKind::Long), 40);
    }

    #[test]
    fn test_rest_disabled_goes_straight_on() {
        let settings = SessionSettings {
            rest_enabled: false,
            ..SessionSettings::default()
        };
        let mut s = WorkoutSession::new(mixed_plan(), None, DayKey::Number(1), 1, settings).unwrap();
        s.begin(t0()).unwrap();
        s.skip(t0()).unwrap();
        assert_eq!(s.status(), SessionStatus::Active);
        assert_eq!(s.current_exercise().unwrap().name, "Squat");
        assert!(s.timer().is_none());
    }

    #[test]
    fn test_timed_disabled_makes_everything_rep_based() {
        let settings = SessionSettings {
            timed_exercises: false,
            ..SessionSettings::default()
        };
        let mut s = WorkoutSession::new(mixed_plan(), None, DayKey::Number(1), 1, settings).unwrap();
        s.begin(t0()).unwrap();
        assert!(s.timer().is_none());
        assert_eq!(s.current_drive(), Some(Drive::Reps));
        assert!(matches!(
            s.complete_set(t0()).unwrap(),
            SessionEvent::Advanced(_)
        ));
    }

    #[test]
    fn test_complete_set_rejected_while_resting() {
        let mut s = session(1);
        s.begin(t0()).unwrap();
        s.skip(t0()).unwrap();
        assert_eq!(s.status(), SessionStatus::Resting);
        assert!(matches!(s.complete_set(t0()), Err(Error::Other(_))));
        // still resting, nothing moved
        assert_eq!(s.state().exercise_index, 1);
        assert_eq!(s.status(), SessionStatus::Resting);
    }

    #[test]
    fn test_circuit_bounds() {
        let mut s = session(1);
        assert!(s.set_total_circuits(3).is_ok());
        assert_eq!(s.state().total_circuits, 3);
        assert!(matches!(
            s.set_total_circuits(4),
            Err(Error::InvalidCircuits { value: 4, .. })
        ));
        assert_eq!(s.state().total_circuits, 3);

        let bad = WorkoutSession::new(mixed_plan(), None, DayKey::Number(1), 0, SessionSettings::default());
        assert!(bad.is_err());
    }

    #[test]
    fn test_invalid_index_aborts_session() {
        let mut s = session(1);
        s.begin(t0()).unwrap();
        s.timer = None;
        s.state.exercise_index = 99;
        assert!(matches!(s.complete_set(t0()), Err(Error::Progression(_))));
        assert!(s.is_aborted());
        assert!(s.timer().is_none());
        assert!(matches!(s.tick(t0()), Err(Error::SessionEnded)));
    }

    #[test]
    fn test_empty_plan_rejected() {
        let result = WorkoutSession::new(plan(vec![]), None, DayKey::Number(1), 1, SessionSettings::default());
        assert!(matches!(result, Err(Error::Progression(_))));
    }

    #[test]
    fn test_go_back_with_running_timer() {
        let mut s = session(1);
        s.begin(t0()).unwrap();
        assert!(s.timer().is_some());
        s.go_back();
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::milliseconds(0)), "0m 0s");
        assert_eq!(format_elapsed(Duration::milliseconds(59_600)), "1m 0s");
        assert_eq!(format_elapsed(Duration::seconds(754)), "12m 34s");
    }
}
