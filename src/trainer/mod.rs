//! # Trainer Module
//!
//! Schedule a lesson against the transport clock and grade live playing against it.
//!
//! ## Purpose
//! A lesson is a list of expected notes at beat offsets. The trainer:
//! 1. **Arms** the lesson: picks the steps inside the chosen beat range and works out
//!    the absolute transport time each one is expected at
//! 2. **Plays** it: schedules, per step, a current-step marker, a demonstration
//!    trigger and its release, plus one terminal cue at the end of the range
//! 3. **Grades** live note-ons against the current step's pitch and time
//!
//! ## Sub-modules
//! - `types` - Options, classification and status types
//! - `lesson` - Lesson scripts and YAML loading
//! - `grading` - The per-pass grading session
//! - `scheduler` - The [`Trainer`] state machine
//!
//! ## Timing
//! - Seconds per beat = `60 / tempo / speed`
//! - Beat 0 lands `lead-in` seconds after the lesson starts
//! - Expected time of a step = `origin + beat * seconds_per_beat`, using the step's
//!   absolute beat, so a range starting at beat 4 waits four beats before its first step
//! - The terminal cue fires `end-padding` seconds after the range end
//!
//! ## Grading
//! - Correct pitch within the tolerance window: `on`, hit and streak both go up
//! - Correct pitch outside it: `early` or `late`, streak resets, no hit
//! - Wrong pitch: ignored, so exploring the keyboard is never penalised
//! - `accuracy = round(100 * hits / max(1, total))`
//!
//! A mistimed press does not retire the step; a later on-time press for the same
//! step still counts.
//!
//! ## Looping
//! When the terminal cue fires on a looped session the trainer re-arms from the
//! current time with a completely fresh grading session.
//!
//! ## Example
//! ```rust
//! use keybed::config::EngineConfig;
//! use keybed::device::SimulatedDevice;
//! use keybed::trainer::{Lesson, PracticeOptions, Trainer, TrainerState};
//!
//! let lesson = Lesson::from_yaml(r#"
//! id: two-notes
//! tempo: 60
//! steps:
//!   - { beat: 0, pitch: C4 }
//!   - { beat: 1, pitch: E4 }
//! "#).unwrap();
//!
//! let mut device = SimulatedDevice::new();
//! let mut trainer = Trainer::new(EngineConfig::default());
//! trainer.start(&mut device, lesson, PracticeOptions::default()).unwrap();
//!
//! assert_eq!(trainer.state(), TrainerState::Playing);
//! assert_eq!(trainer.status().total_count, 2);
//! ```

mod grading;
mod lesson;
mod scheduler;
mod types;


pub use grading::{accuracy, GradingSession};
pub use lesson::{Lesson, LessonStep};
pub use scheduler::{DemoSound, Trainer};
pub use types::{BeatRange, Classification, PracticeOptions, TrainerState, TrainerStatus};
