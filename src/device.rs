//! # Sound Device
//!
//! The engine never produces audio or keeps time itself. Both come from a
//! [`SoundDevice`]: it triggers and releases pitches, reports the transport clock,
//! and holds scheduled [`Cue`]s until they fall due.
//!
//! ## Cues
//! Scheduled callbacks are plain data rather than closures. The device stores
//! them and hands due ones back through [`SoundDevice::next_due`]; the engine
//! dispatches them on its own thread. Cues scheduled for the same time come back
//! in the order they were scheduled, and a cancelled cue never comes back.
//!
//! ## Simulated clock
//! [`SimulatedDevice`] is a deterministic transport: time only moves when the
//! host moves it, and every trigger/release is appended to an action log. It
//! backs the tests and the command-line front end.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeybedError;
use crate::pitch::Pitch;

/// Instrument voice a note is played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    #[default]
    Piano,
    Keys,
    Drums,
}

impl FromStr for Instrument {
    type Err = KeybedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "piano" => Ok(Instrument::Piano),
            "keys" => Ok(Instrument::Keys),
            "drums" => Ok(Instrument::Drums),
            _ => Err(KeybedError::ParseError {
                input: s.to_string(),
                message: "unknown instrument (expected piano, keys or drums)".to_string(),
            }),
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Instrument::Piano => "piano",
            Instrument::Keys => "keys",
            Instrument::Drums => "drums",
        };
        f.write_str(name)
    }
}

/// Handle for a scheduled cue, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CueToken(pub u64);

/// Work the engine asks the device to hand back at a later time
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    /// Sound a replayed pitch
    Trigger {
        pitch: Pitch,
        velocity: f32,
        instrument: Instrument,
    },
    /// Silence a replayed pitch
    Release { pitch: Pitch, instrument: Instrument },
    /// Recording replay has played its last event
    ReplayFinished,
    /// Lesson step `index` is now the one being graded
    StepMarker { index: usize },
    /// Demonstrate lesson step `index`
    StepTrigger { index: usize },
    StepRelease { index: usize },
    /// End of the lesson range: stop or loop
    LessonEnd,
}

/// Capability the engine consumes for sound and time.
pub trait SoundDevice {
    fn trigger(&mut self, pitch: Pitch, velocity: f32, instrument: Instrument) -> Result<(), KeybedError>;

    fn release(&mut self, pitch: Pitch, instrument: Instrument) -> Result<(), KeybedError>;

    /// Current transport time in seconds
    fn now(&self) -> f64;

    fn schedule(&mut self, at: f64, cue: Cue) -> CueToken;

    /// Cancel a scheduled cue. Unknown or already-fired tokens are ignored.
    fn cancel(&mut self, token: CueToken);

    /// Remove and return the earliest cue due at or before `now()`
    fn next_due(&mut self) -> Option<Cue>;
}

/// What a device was asked to do, with the transport time it happened at
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceAction {
    Trigger {
        at: f64,
        pitch: Pitch,
        velocity: f32,
        instrument: Instrument,
    },
    Release {
        at: f64,
        pitch: Pitch,
        instrument: Instrument,
    },
}

#[derive(Debug, Clone)]
struct Scheduled {
    at: f64,
    seq: u64,
    token: CueToken,
    cue: Cue,
}

/// Deterministic in-memory transport with an action log.
#[derive(Debug, Default)]
pub struct SimulatedDevice {
    time: f64,
    next_seq: u64,
    pending: Vec<Scheduled>,
    actions: Vec<DeviceAction>,
    unavailable: bool,
}

impl SimulatedDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock. Time never runs backwards.
    pub fn set_time(&mut self, time: f64) {
        if time > self.time {
            self.time = time;
        }
    }

    pub fn advance(&mut self, seconds: f64) {
        self.set_time(self.time + seconds);
    }

    /// Time of the earliest pending cue
    pub fn next_cue_time(&self) -> Option<f64> {
        self.earliest().map(|idx| self.pending[idx].at)
    }

    pub fn pending_cues(&self) -> usize {
        self.pending.len()
    }

    pub fn actions(&self) -> &[DeviceAction] {
        &self.actions
    }

    pub fn take_actions(&mut self) -> Vec<DeviceAction> {
        std::mem::take(&mut self.actions)
    }

    /// Make trigger/release fail, as a disconnected output would
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    fn earliest(&self) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.at.total_cmp(&b.at).then(a.seq.cmp(&b.seq)))
            .map(|(idx, _)| idx)
    }

    fn check_available(&self) -> Result<(), KeybedError> {
        if self.unavailable {
            return Err(KeybedError::DeviceError("output unavailable".to_string()));
        }
        Ok(())
    }
}

impl SoundDevice for SimulatedDevice {
    fn trigger(&mut self, pitch: Pitch, velocity: f32, instrument: Instrument) -> Result<(), KeybedError> {
        self.check_available()?;
        self.actions.push(DeviceAction::Trigger {
            at: self.time,
            pitch,
            velocity,
            instrument,
        });
        Ok(())
    }

    fn release(&mut self, pitch: Pitch, instrument: Instrument) -> Result<(), KeybedError> {
        self.check_available()?;
        self.actions.push(DeviceAction::Release {
            at: self.time,
            pitch,
            instrument,
        });
        Ok(())
    }

    fn now(&self) -> f64 {
        self.time
    }

    fn schedule(&mut self, at: f64, cue: Cue) -> CueToken {
        let seq = self.next_seq;
        self.next_seq += 1;
        let token = CueToken(seq);
        self.pending.push(Scheduled { at, seq, token, cue });
        token
    }

    fn cancel(&mut self, token: CueToken) {
        self.pending.retain(|s| s.token != token);
    }

    fn next_due(&mut self) -> Option<Cue> {
        let idx = self.earliest()?;
        if self.pending[idx].at > self.time {
            return None;
        }
        Some(self.pending.remove(idx).cue)
    }
}
