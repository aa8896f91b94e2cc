#![forbid(unsafe_code)]

//! Core domain model and business logic for the hiit workout runner.
//!
//! This crate provides:
//! - Domain types (exercises, plans, day keys, progression state)
//! - Loading plans from the sheet endpoint or exported files
//! - The progression engine (sets, circuits, rests)
//! - Sessions with a single countdown and elapsed-time tracking
//! - Posting edited days back to the endpoint

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod details;
pub mod plan;
pub mod source;
pub mod engine;
pub mod timer;
pub mod session;
pub mod library;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use details::{drive_for, Drive};
pub use plan::{build_library, RawRecord, WorkoutLibrary};
pub use source::{open_edit_sink, open_source, read_edit_file, EditSink, PlanSource};
pub use engine::detect_circuit;
pub use timer::{Countdown, TimerPurpose};
pub use session::{CompletionSummary, SessionEvent, SessionSettings, WorkoutSession};
pub use library::{LoadStatus, Trainer};
