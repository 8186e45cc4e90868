//! Lesson scripts
//!
//! A lesson is an immutable list of expected notes at beat offsets plus a
//! nominal tempo. Lessons are written as YAML:
//!
//! ```yaml
//! id: twinkle
//! title: Twinkle Twinkle (Excerpt)
//! tempo: 90
//! steps:
//!   - { beat: 0, pitch: C4 }
//!   - { beat: 1, pitch: C4, duration: 0.5, velocity: 0.7 }
//! ```

use serde::Deserialize;

use crate::error::KeybedError;
use crate::pitch::Pitch;

/// One scripted note
#[derive(Debug, Clone, PartialEq)]
pub struct LessonStep {
    pub beat_offset: f64,
    pub pitch: Pitch,
    pub beat_duration: Option<f64>,
    pub velocity: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    /// Beats per minute
    pub tempo: f64,
    pub steps: Vec<LessonStep>,
}

/// Lesson as written, before validation
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawLesson {
    id: String,
    #[serde(default)]
    title: Option<String>,
    tempo: f64,
    #[serde(default)]
    steps: Vec<RawStep>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawStep {
    beat: f64,
    pitch: String,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    velocity: Option<f32>,
}

impl Lesson {
    /// Build a validated lesson
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        tempo: f64,
        steps: Vec<LessonStep>,
    ) -> Result<Self, KeybedError> {
        let lesson = Lesson {
            id: id.into(),
            title: title.into(),
            tempo,
            steps,
        };
        lesson.validate()?;
        Ok(lesson)
    }

    pub fn from_yaml(source: &str) -> Result<Self, KeybedError> {
        let raw: RawLesson =
            serde_yaml::from_str(source).map_err(|e| KeybedError::LessonError(e.to_string()))?;

        let mut steps = Vec::with_capacity(raw.steps.len());
        for (i, step) in raw.steps.into_iter().enumerate() {
            let pitch = step.pitch.parse::<Pitch>().map_err(|e| {
                KeybedError::LessonError(format!("step {}: {}", i, e))
            })?;
            steps.push(LessonStep {
                beat_offset: step.beat,
                pitch,
                beat_duration: step.duration,
                velocity: step.velocity,
            });
        }

        let title = raw.title.unwrap_or_else(|| raw.id.clone());
        Lesson::new(raw.id, title, raw.tempo, steps)
    }

    fn validate(&self) -> Result<(), KeybedError> {
        if !(self.tempo.is_finite() && self.tempo > 0.0) {
            return Err(KeybedError::LessonError(format!(
                "tempo must be positive, got {}",
                self.tempo
            )));
        }
        for (i, step) in self.steps.iter().enumerate() {
            let fail = |msg: &str| Err(KeybedError::LessonError(format!("step {}: {}", i, msg)));
            if !(step.beat_offset.is_finite() && step.beat_offset >= 0.0) {
                return fail("beat must be a non-negative number");
            }
            if let Some(duration) = step.beat_duration {
                if !(duration.is_finite() && duration > 0.0) {
                    return fail("duration must be positive");
                }
            }
            if let Some(velocity) = step.velocity {
                if !(0.0..=1.0).contains(&velocity) {
                    return fail("velocity must be between 0 and 1");
                }
            }
        }
        Ok(())
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.tempo
    }

    /// Whole beats needed to cover every step including its duration
    pub fn total_beats(&self, default_step_beats: f64) -> f64 {
        self.steps
            .iter()
            .map(|s| s.beat_offset + s.beat_duration.unwrap_or(default_step_beats))
            .fold(0.0, f64::max)
            .ceil()
    }
}
