//! Live timing grades against the expected lesson steps

use crate::pitch::Pitch;

use super::types::Classification;

/// Grading state for one pass over the selected lesson steps.
///
/// Rebuilt from scratch every time playback (re)starts, including loop restarts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradingSession {
    /// Absolute transport time each selected step is expected at
    pub expected_times: Vec<f64>,
    pub expected_pitches: Vec<Pitch>,
    pub hit_count: u32,
    pub total_count: u32,
    pub streak: u32,
    pub classification: Classification,
    /// Step currently expected; `None` before the first marker and after the end
    pub current_step: Option<usize>,
    pub accuracy: u32,
}

impl GradingSession {
    pub fn new(expected: Vec<(f64, Pitch)>) -> Self {
        let total_count = expected.len() as u32;
        let (expected_times, expected_pitches) = expected.into_iter().unzip();
        Self {
            expected_times,
            expected_pitches,
            total_count,
            ..Self::default()
        }
    }

    /// Grade a live press. Returns the new classification, or `None` when the
    /// press is not graded (no current step, or wrong pitch).
    ///
    /// A correct pitch within `window` seconds is a hit. A correct pitch outside
    /// it is early or late and breaks the streak. Wrong pitches are ignored.
    pub fn grade(&mut self, pitch: Pitch, timestamp: f64, window: f64) -> Option<Classification> {
        let idx = self.current_step?;
        let target = *self.expected_times.get(idx)?;
        if self.expected_pitches.get(idx) != Some(&pitch) {
            return None;
        }

        let delta = timestamp - target;
        let verdict = if delta.abs() <= window {
            self.hit_count += 1;
            self.streak += 1;
            Classification::On
        } else {
            self.streak = 0;
            if delta < 0.0 {
                Classification::Early
            } else {
                Classification::Late
            }
        };
        self.classification = verdict;
        self.accuracy = accuracy(self.hit_count, self.total_count);
        Some(verdict)
    }
}

/// `round(100 * hits / max(1, total))`
pub fn accuracy(hit_count: u32, total_count: u32) -> u32 {
    (100.0 * hit_count as f64 / total_count.max(1) as f64).round() as u32
}
