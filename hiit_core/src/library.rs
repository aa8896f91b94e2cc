//! Load status and workout selection.
//!
//! A failed load is sticky: no workout can start until a reload succeeds.

use crate::plan::{build_library, WorkoutLibrary};
use crate::session::{SessionSettings, WorkoutSession};
use crate::source::{EditSink, PlanSource};
use crate::{Config, DayKey, Error, ExerciseEdit, Result};

#[derive(Debug, Default)]
pub enum LoadStatus {
    #[default]
    NotLoaded,
    Loaded(WorkoutLibrary),
    Failed(String),
}

/// Entry point for front ends: holds configuration and the loaded plans
pub struct Trainer {
    config: Config,
    status: LoadStatus,
}

impl Trainer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            status: LoadStatus::NotLoaded,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Fetch and group plans, replacing whatever was loaded before.
    ///
    /// On failure the previous library is dropped and the error is kept so
    /// later start attempts can report it.
    pub fn reload(&mut self, source: &dyn PlanSource) -> Result<&WorkoutLibrary> {
        let loaded = source
            .fetch_records()
            .and_then(|records| build_library(&records, self.config.features.phases));

        match loaded {
            Ok(library) => {
                self.status = LoadStatus::Loaded(library);
                self.library()
            }
            Err(e) => {
                tracing::error!("Failed to load workouts from {}: {}", source.describe(), e);
                self.status = LoadStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    pub fn library(&self) -> Result<&WorkoutLibrary> {
        match &self.status {
            LoadStatus::Loaded(library) => Ok(library),
            LoadStatus::NotLoaded => Err(Error::NotLoaded(None)),
            LoadStatus::Failed(message) => Err(Error::NotLoaded(Some(message.clone()))),
        }
    }

    /// Phase to use when none was requested
    pub fn resolve_phase<'a>(&'a self, requested: Option<&'a str>) -> Result<Option<&'a str>> {
        let library = self.library()?;
        if !self.config.features.phases {
            return Ok(None);
        }
        Ok(library.resolve_phase(requested, &self.config.session.default_phase))
    }

    /// Start a workout for a phase/day. `circuits` defaults from config.
    pub fn start(
        &self,
        phase: Option<&str>,
        day: &DayKey,
        circuits: Option<u32>,
    ) -> Result<WorkoutSession> {
        let library = self.library()?;
        let phase = self.resolve_phase(phase)?;

        let plan = library.plan(phase, day).ok_or_else(|| {
            tracing::warn!("No workout for {:?} / day {}", phase, day);
            Error::Unavailable {
                phase: phase.unwrap_or("(no phase)").to_string(),
                day: day.to_string(),
            }
        })?;

        WorkoutSession::new(
            plan,
            phase.map(str::to_string),
            day.clone(),
            circuits.unwrap_or(self.config.session.default_circuits),
            SessionSettings::from(&self.config),
        )
    }

    /// Send an edited day to the sink. The loaded plans are not touched;
    /// reload to see the change.
    pub fn save_day(
        &self,
        sink: &dyn EditSink,
        day: &DayKey,
        exercises: &[ExerciseEdit],
    ) -> Result<String> {
        if !self.config.features.editing {
            return Err(Error::EditingDisabled);
        }
        sink.update_day(day, exercises)
    }
}
