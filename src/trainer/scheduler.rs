//! Lesson scheduling against the transport clock
//!
//! Arming turns the in-range lesson steps into absolute transport times;
//! playing hands every step's marker, demonstration trigger and release to the
//! device as cues, plus one terminal cue at the end of the range.

use log::{debug, info};

use crate::config::EngineConfig;
use crate::device::{Cue, CueToken, SoundDevice};
use crate::error::KeybedError;
use crate::pitch::Pitch;

use super::grading::GradingSession;
use super::lesson::Lesson;
use super::types::{BeatRange, Classification, PracticeOptions, TrainerState, TrainerStatus};

/// Sound the trainer wants made; the caller owns the device policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DemoSound {
    Trigger { pitch: Pitch, velocity: f32 },
    Release { pitch: Pitch },
}

/// A selected step with its absolute times
#[derive(Debug, Clone, Copy, PartialEq)]
struct ArmedStep {
    pitch: Pitch,
    velocity: f32,
    expected_time: f64,
    release_time: f64,
}

/// Lesson scheduler and live grader
#[derive(Debug)]
pub struct Trainer {
    config: EngineConfig,
    state: TrainerState,
    lesson: Option<Lesson>,
    options: PracticeOptions,
    steps: Vec<ArmedStep>,
    end_time: f64,
    session: GradingSession,
    tokens: Vec<CueToken>,
    /// Demonstration pitches triggered and not yet released
    sounding: Vec<Pitch>,
    loops_completed: u32,
}

impl Trainer {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: TrainerState::Idle,
            lesson: None,
            options: PracticeOptions::default(),
            steps: Vec::new(),
            end_time: 0.0,
            session: GradingSession::default(),
            tokens: Vec::new(),
            sounding: Vec::new(),
            loops_completed: 0,
        }
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn session(&self) -> &GradingSession {
        &self.session
    }

    pub fn lesson(&self) -> Option<&Lesson> {
        self.lesson.as_ref()
    }

    /// Select the in-range steps and compute their expected times from `now`.
    ///
    /// Resets grading. Nothing is scheduled until [`Trainer::play`].
    pub fn arm(&mut self, lesson: Lesson, options: PracticeOptions, now: f64) -> Result<(), KeybedError> {
        // Only a caller's range is checked; a lesson without steps arms empty
        let range = match options.range {
            Some(range) => {
                if !(range.start.is_finite() && range.end.is_finite()) || range.start < 0.0 {
                    return Err(KeybedError::LessonError(format!(
                        "beat range {}..{} is not valid",
                        range.start, range.end
                    )));
                }
                if range.end <= range.start {
                    return Err(KeybedError::LessonError(format!(
                        "beat range {}..{} is empty",
                        range.start, range.end
                    )));
                }
                range
            }
            None => BeatRange::new(0.0, lesson.total_beats(self.config.default_step_beats)),
        };

        let options = PracticeOptions {
            speed: self.config.clamp_speed(options.speed),
            range: Some(range),
            ..options
        };
        self.lesson = Some(lesson);
        self.options = options;
        self.loops_completed = 0;
        self.rearm(now);
        Ok(())
    }

    /// Recompute times for the stored lesson from a fresh origin
    fn rearm(&mut self, now: f64) {
        let Some(lesson) = self.lesson.as_ref() else {
            return;
        };
        let Some(range) = self.options.range else {
            return;
        };
        let seconds_per_beat = lesson.seconds_per_beat() / self.options.speed;
        let origin = now + self.config.lead_in;

        self.steps = lesson
            .steps
            .iter()
            .filter(|step| range.contains(step.beat_offset))
            .map(|step| {
                let expected_time = origin + step.beat_offset * seconds_per_beat;
                let beats = step.beat_duration.unwrap_or(self.config.default_step_beats);
                ArmedStep {
                    pitch: step.pitch,
                    velocity: step.velocity.unwrap_or(self.config.default_velocity),
                    expected_time,
                    release_time: expected_time + beats * seconds_per_beat,
                }
            })
            .collect();
        self.end_time = origin + range.end * seconds_per_beat + self.config.end_padding;
        self.session = GradingSession::new(
            self.steps.iter().map(|s| (s.expected_time, s.pitch)).collect(),
        );
        self.state = TrainerState::Armed;
        debug!(
            "armed {} steps, origin {:.3}s, end {:.3}s",
            self.steps.len(),
            origin,
            self.end_time
        );
    }

    /// Hand the armed session to the device clock
    pub fn play<D: SoundDevice + ?Sized>(&mut self, device: &mut D) {
        if self.state != TrainerState::Armed {
            return;
        }
        for (index, step) in self.steps.iter().enumerate() {
            // Marker first so it never fires after its own trigger
            self.tokens.push(device.schedule(step.expected_time, Cue::StepMarker { index }));
            self.tokens.push(device.schedule(step.expected_time, Cue::StepTrigger { index }));
            self.tokens.push(device.schedule(step.release_time, Cue::StepRelease { index }));
        }
        self.tokens.push(device.schedule(self.end_time, Cue::LessonEnd));
        self.state = TrainerState::Playing;
    }

    /// Cancel anything from a previous session, then arm and play `lesson`.
    ///
    /// Returns releases for demonstration notes the old session left sounding.
    pub fn start<D: SoundDevice + ?Sized>(
        &mut self,
        device: &mut D,
        lesson: Lesson,
        options: PracticeOptions,
    ) -> Result<Vec<DemoSound>, KeybedError> {
        let silenced = self.cancel(device);
        info!("starting lesson '{}' at speed {}", lesson.id, options.speed);
        self.arm(lesson, options, device.now())?;
        self.play(device);
        Ok(silenced)
    }

    /// Stop playback: drop every pending cue and return to `Idle`.
    ///
    /// Counters are left as they were.
    pub fn cancel<D: SoundDevice + ?Sized>(&mut self, device: &mut D) -> Vec<DemoSound> {
        for token in self.tokens.drain(..) {
            device.cancel(token);
        }
        if self.state != TrainerState::Idle {
            debug!("trainer cancelled");
        }
        self.state = TrainerState::Idle;
        self.session.current_step = None;
        self.sounding
            .drain(..)
            .map(|pitch| DemoSound::Release { pitch })
            .collect()
    }

    /// Handle a due cue addressed to the trainer
    pub fn on_cue<D: SoundDevice + ?Sized>(&mut self, device: &mut D, cue: &Cue) -> Vec<DemoSound> {
        if self.state != TrainerState::Playing {
            return Vec::new();
        }
        match *cue {
            Cue::StepMarker { index } => {
                if index < self.steps.len() {
                    self.session.current_step = Some(index);
                }
                Vec::new()
            }
            Cue::StepTrigger { index } => match self.steps.get(index) {
                Some(step) => {
                    self.sounding.push(step.pitch);
                    vec![DemoSound::Trigger {
                        pitch: step.pitch,
                        velocity: step.velocity,
                    }]
                }
                None => Vec::new(),
            },
            Cue::StepRelease { index } => match self.steps.get(index) {
                Some(step) => match self.sounding.iter().position(|p| *p == step.pitch) {
                    Some(pos) => {
                        self.sounding.remove(pos);
                        vec![DemoSound::Release { pitch: step.pitch }]
                    }
                    None => Vec::new(),
                },
                None => Vec::new(),
            },
            Cue::LessonEnd => self.finish(device),
            _ => Vec::new(),
        }
    }

    /// End of range: loop from the top with a fresh session, or stop
    fn finish<D: SoundDevice + ?Sized>(&mut self, device: &mut D) -> Vec<DemoSound> {
        let looped = self.options.looped;
        let silenced = self.cancel(device);
        if looped {
            self.loops_completed += 1;
            debug!("lesson loop {} complete, restarting", self.loops_completed);
            self.rearm(device.now());
            self.play(device);
        } else {
            info!(
                "lesson finished: {} of {} on time",
                self.session.hit_count, self.session.total_count
            );
        }
        silenced
    }

    /// Grade a live note-on. Ignored unless a lesson is playing.
    pub fn on_live_note_on(&mut self, pitch: Pitch, timestamp: f64) -> Option<Classification> {
        if self.state != TrainerState::Playing {
            return None;
        }
        self.session.grade(pitch, timestamp, self.config.tolerance_window)
    }

    pub fn status(&self) -> TrainerStatus {
        TrainerStatus {
            state: self.state,
            lesson_id: self.lesson.as_ref().map(|l| l.id.clone()),
            accuracy: self.session.accuracy,
            streak: self.session.streak,
            hit_count: self.session.hit_count,
            total_count: self.session.total_count,
            classification: self.session.classification,
            current_step: self.session.current_step,
            loops_completed: self.loops_completed,
        }
    }
}
