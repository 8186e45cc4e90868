//! Trainer type definitions
//!
//! Options a lesson is started with, and the read-only status the trainer
//! exposes to UI collaborators.

use serde::Serialize;

/// Timing verdict for the most recent correct-pitch press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Nothing graded yet in this session
    #[default]
    None,
    Early,
    Late,
    On,
}

/// Trainer lifecycle
///
/// `Idle -> Armed -> Playing -> (Idle | Armed again when looping)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainerState {
    #[default]
    Idle,
    Armed,
    Playing,
}

/// Half-open beat window `[start, end)` of a lesson to practise
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BeatRange {
    pub start: f64,
    pub end: f64,
}

impl BeatRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, beat: f64) -> bool {
        beat >= self.start && beat < self.end
    }
}

/// How a lesson should be practised
///
/// # Fields
/// - `speed`: tempo multiplier, clamped into the configured speed limits
/// - `looped`: restart from the top when the range ends
/// - `range`: beats to practise; `None` means the whole lesson
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PracticeOptions {
    pub speed: f64,
    pub looped: bool,
    pub range: Option<BeatRange>,
}

impl Default for PracticeOptions {
    fn default() -> Self {
        Self {
            speed: 1.0,
            looped: false,
            range: None,
        }
    }
}

/// Snapshot of the grading session for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerStatus {
    pub state: TrainerState,
    pub lesson_id: Option<String>,
    /// Percentage of in-range steps hit on time, 0..=100
    pub accuracy: u32,
    pub streak: u32,
    pub hit_count: u32,
    pub total_count: u32,
    pub classification: Classification,
    /// Step currently expected, if any
    pub current_step: Option<usize>,
    /// Completed passes of a looped session
    pub loops_completed: u32,
}
