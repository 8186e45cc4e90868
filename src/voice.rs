//! Polyphonic voice bookkeeping
//!
//! Tracks which input identifiers are holding which sounding pitches.
//!
//! - One binding per identifier; a second press on a bound identifier is a repeat
//!   and is ignored.
//! - A binding stores the pitch it sounded at press time, so later transpose or
//!   octave changes never move a held note.
//! - A pitch stops sounding only when the last identifier holding it lets go, and
//!   never while the sustain pedal is down.
//! - Pressing a pitch that only the pedal is keeping alive retriggers it; the
//!   new holder owns it and the pedal no longer releases it.
//!
//! The tracker decides; it does not actuate. Callers forward the returned
//! outcomes to the sound device.

use std::fmt;

use crate::error::KeybedError;
use crate::pitch::Pitch;

/// Opaque, source-specific input identifier (key code, pointer id, channel+key)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        SourceId(id.into())
    }

    /// Identifier for inputs that carry none: keyed by the pressed pitch name
    pub fn for_pitch(pitch: Pitch) -> Self {
        SourceId(format!("pitch:{}", pitch))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        SourceId::new(id)
    }
}

/// Snapshot taken at press time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding {
    pub pitch: Pitch,
    pub velocity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressOutcome {
    /// New binding; the pitch must be triggered
    Sounded(Pitch),
    /// New binding on a pitch the pedal was keeping alive; the old note ends
    /// and the pitch is triggered again
    Retriggered(Pitch),
    /// Identifier already bound (key auto-repeat); nothing to do
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    /// Last holder let go; the pitch must be released
    Released(Pitch),
    /// Held on by the sustain pedal
    Sustained(Pitch),
    /// Another identifier still holds the same pitch
    StillHeld(Pitch),
}

#[derive(Debug, Default)]
pub struct VoiceTracker {
    /// Bindings in press order
    bindings: Vec<(SourceId, Binding)>,
    /// Sounding pitches in the order they started
    voices: Vec<Pitch>,
    sustain: bool,
    /// Pitches kept alive only by the pedal, in the order they were let go
    sustained: Vec<Pitch>,
}

impl VoiceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_down(&mut self, id: SourceId, pitch: Pitch, velocity: f32) -> PressOutcome {
        if self.binding(&id).is_some() {
            return PressOutcome::Repeat;
        }
        self.bindings.push((id, Binding { pitch, velocity }));
        if !self.voices.contains(&pitch) {
            self.voices.push(pitch);
        }
        if let Some(idx) = self.sustained.iter().position(|p| *p == pitch) {
            self.sustained.remove(idx);
            return PressOutcome::Retriggered(pitch);
        }
        PressOutcome::Sounded(pitch)
    }

    /// Unbind `id`. Fails with `UnsupportedInput` when `id` holds nothing.
    pub fn note_up(&mut self, id: &SourceId) -> Result<ReleaseOutcome, KeybedError> {
        let idx = self
            .bindings
            .iter()
            .position(|(bound, _)| bound == id)
            .ok_or_else(|| KeybedError::UnsupportedInput(id.to_string()))?;
        let (_, binding) = self.bindings.remove(idx);
        let pitch = binding.pitch;

        if self.is_bound(pitch) {
            return Ok(ReleaseOutcome::StillHeld(pitch));
        }
        if self.sustain {
            if !self.sustained.contains(&pitch) {
                self.sustained.push(pitch);
            }
            return Ok(ReleaseOutcome::Sustained(pitch));
        }
        self.voices.retain(|p| *p != pitch);
        Ok(ReleaseOutcome::Released(pitch))
    }

    pub fn sustain(&self) -> bool {
        self.sustain
    }

    /// Set the pedal. Lifting it returns every pitch that must now be released,
    /// each exactly once, in the order they were sustained.
    pub fn set_sustain(&mut self, on: bool) -> Vec<Pitch> {
        self.sustain = on;
        if on {
            return Vec::new();
        }
        let mut released = Vec::new();
        for pitch in std::mem::take(&mut self.sustained) {
            self.voices.retain(|p| *p != pitch);
            released.push(pitch);
        }
        released
    }

    pub fn binding(&self, id: &SourceId) -> Option<&Binding> {
        self.bindings.iter().find(|(bound, _)| bound == id).map(|(_, b)| b)
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Currently sounding pitches
    pub fn voices(&self) -> &[Pitch] {
        &self.voices
    }

    pub fn is_sounding(&self, pitch: Pitch) -> bool {
        self.voices.contains(&pitch)
    }

    fn is_bound(&self, pitch: Pitch) -> bool {
        self.bindings.iter().any(|(_, b)| b.pitch == pitch)
    }
}
