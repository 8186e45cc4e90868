//! # Recorder
//!
//! Captures a performance as a timestamped list of [`NoteEvent`]s, replays it
//! through a [`SoundDevice`], and moves it in and out of the interchange format.
//!
//! ## Lifecycle
//! `Idle --start--> Recording --stop--> Idle`. Starting clears the buffer and
//! takes a fresh start time from the device clock; stopping freezes the buffer.
//! Import replaces the buffer wholesale and forces `Idle`.
//!
//! ## Interchange format
//! A recording is an ordered list of records. YAML is the primary form:
//!
//! ```yaml
//! - pitch: C4
//!   onTimeSeconds: 0.0
//!   durationSeconds: 0.5
//!   velocity: 0.8
//!   instrumentId: piano
//! ```
//!
//! JSON with the same shape is accepted as well, and so are the shorter field
//! names written by older exports (`note`, `time`, `duration`, `instrument`).
//! Every import is validated at the boundary and fails as a whole.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::device::{Cue, CueToken, Instrument, SoundDevice};
use crate::error::KeybedError;
use crate::pitch::Pitch;

/// One captured note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NoteEvent {
    #[serde(alias = "note")]
    pub pitch: Pitch,
    /// Seconds since the recording started
    #[serde(alias = "time")]
    pub on_time_seconds: f64,
    /// `None` while the note is still sounding
    #[serde(default, alias = "duration")]
    pub duration_seconds: Option<f64>,
    pub velocity: f32,
    #[serde(rename = "instrumentId", alias = "instrument")]
    pub instrument: Instrument,
}

impl NoteEvent {
    fn validate(&self, index: usize) -> Result<(), KeybedError> {
        let fail = |what: &str| Err(KeybedError::ImportError(format!("event {}: {}", index, what)));

        if !(self.on_time_seconds.is_finite() && self.on_time_seconds >= 0.0) {
            return fail("onTimeSeconds must be a non-negative number");
        }
        if let Some(duration) = self.duration_seconds {
            if !(duration.is_finite() && duration >= 0.0) {
                return fail("durationSeconds must be a non-negative number or null");
            }
        }
        if !(0.0..=1.0).contains(&self.velocity) {
            return fail("velocity must be between 0 and 1");
        }
        Ok(())
    }
}

/// An ordered, frozen list of note events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recording {
    pub events: Vec<NoteEvent>,
}

impl Recording {
    pub fn new(events: Vec<NoteEvent>) -> Self {
        Self { events }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn validate(&self) -> Result<(), KeybedError> {
        for (i, event) in self.events.iter().enumerate() {
            event.validate(i)?;
        }
        Ok(())
    }

    pub fn from_yaml(source: &str) -> Result<Self, KeybedError> {
        let recording: Recording =
            serde_yaml::from_str(source).map_err(|e| KeybedError::ImportError(e.to_string()))?;
        recording.validate()?;
        Ok(recording)
    }

    pub fn from_json(source: &str) -> Result<Self, KeybedError> {
        let recording: Recording =
            serde_json::from_str(source).map_err(|e| KeybedError::ImportError(e.to_string()))?;
        recording.validate()?;
        Ok(recording)
    }

    pub fn to_yaml(&self) -> Result<String, KeybedError> {
        serde_yaml::to_string(self).map_err(|e| KeybedError::ExportError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, KeybedError> {
        serde_json::to_string_pretty(self).map_err(|e| KeybedError::ExportError(e.to_string()))
    }

    /// Time of the last trigger or release
    pub fn end_time(&self) -> f64 {
        self.events
            .iter()
            .map(|e| e.on_time_seconds + e.duration_seconds.unwrap_or(0.0))
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
}

/// Result of asking for a replay
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplayStatus {
    /// Nothing to play; already complete
    Empty,
    /// Scheduled; completes at this transport time
    Scheduled { finishes_at: f64 },
}

#[derive(Debug, Default)]
pub struct Recorder {
    state: RecorderState,
    start_time: f64,
    events: Vec<NoteEvent>,
    replay_tokens: Vec<CueToken>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    pub fn is_replaying(&self) -> bool {
        !self.replay_tokens.is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Begin a new take, discarding the previous buffer
    pub fn start(&mut self, now: f64) {
        self.events.clear();
        self.start_time = now;
        self.state = RecorderState::Recording;
        info!("recording started at {:.3}s", now);
    }

    pub fn stop(&mut self) {
        if self.state == RecorderState::Recording {
            info!("recording stopped with {} events", self.events.len());
        }
        self.state = RecorderState::Idle;
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.state = RecorderState::Idle;
    }

    /// Append an open event. Ignored unless recording.
    pub fn capture(&mut self, pitch: Pitch, velocity: f32, instrument: Instrument, now: f64) {
        if !self.is_recording() {
            return;
        }
        self.events.push(NoteEvent {
            pitch,
            on_time_seconds: now - self.start_time,
            duration_seconds: None,
            velocity,
            instrument,
        });
    }

    /// Close the most recent open event for `pitch`. Ignored unless recording.
    pub fn close_duration(&mut self, pitch: Pitch, now: f64) {
        self.close_open(pitch, now, true);
    }

    /// Close the earliest open event for `pitch`. Used when one of several
    /// inputs sharing a pitch lets go. Ignored unless recording.
    pub fn close_oldest(&mut self, pitch: Pitch, now: f64) {
        self.close_open(pitch, now, false);
    }

    fn close_open(&mut self, pitch: Pitch, now: f64, newest: bool) {
        if !self.is_recording() {
            return;
        }
        let elapsed = now - self.start_time;
        let is_open = |e: &NoteEvent| e.pitch == pitch && e.duration_seconds.is_none();
        let index = if newest {
            self.events.iter().rposition(is_open)
        } else {
            self.events.iter().position(is_open)
        };
        match index.and_then(|i| self.events.get_mut(i)) {
            Some(event) => event.duration_seconds = Some(elapsed - event.on_time_seconds),
            None => debug!("no open event for {} to close", pitch),
        }
    }

    /// Copy of the buffer; later recording does not show through it
    pub fn export(&self) -> Recording {
        Recording::new(self.events.clone())
    }

    /// Replace the buffer wholesale and stop recording
    pub fn import(&mut self, recording: Recording) {
        info!("imported recording with {} events", recording.len());
        self.events = recording.events;
        self.state = RecorderState::Idle;
    }

    /// Schedule the whole buffer on the device, relative to `now + lead`.
    ///
    /// Any replay still in flight is cancelled first.
    pub fn replay<D: SoundDevice + ?Sized>(&mut self, device: &mut D, lead: f64) -> ReplayStatus {
        self.cancel_replay(device);
        if self.events.is_empty() {
            return ReplayStatus::Empty;
        }

        let origin = device.now() + lead;
        let mut finishes_at = origin;
        for event in &self.events {
            let on = origin + event.on_time_seconds;
            self.replay_tokens.push(device.schedule(
                on,
                Cue::Trigger {
                    pitch: event.pitch,
                    velocity: event.velocity,
                    instrument: event.instrument,
                },
            ));
            finishes_at = finishes_at.max(on);
            if let Some(duration) = event.duration_seconds {
                let off = on + duration;
                self.replay_tokens.push(device.schedule(
                    off,
                    Cue::Release {
                        pitch: event.pitch,
                        instrument: event.instrument,
                    },
                ));
                finishes_at = finishes_at.max(off);
            }
        }
        // Scheduled last, so it fires after everything at the same instant
        self.replay_tokens.push(device.schedule(finishes_at, Cue::ReplayFinished));
        info!("replaying {} events, finishing at {:.3}s", self.events.len(), finishes_at);
        ReplayStatus::Scheduled { finishes_at }
    }

    pub fn cancel_replay<D: SoundDevice + ?Sized>(&mut self, device: &mut D) {
        for token in self.replay_tokens.drain(..) {
            device.cancel(token);
        }
    }

    /// Called when the completion cue fires
    pub fn replay_finished(&mut self) {
        self.replay_tokens.clear();
        debug!("replay finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceAction, SimulatedDevice};
    use pretty_assertions::assert_eq;

    fn pitch(name: &str) -> Pitch {
        name.parse().unwrap()
    }

    fn sample_take() -> Recorder {
        let mut recorder = Recorder::new();
        recorder.start(10.0);
        recorder.capture(pitch("C4"), 0.8, Instrument::Piano, 10.0);
        recorder.capture(pitch("E4"), 0.6, Instrument::Piano, 10.5);
        recorder.close_duration(pitch("C4"), 11.0);
        recorder.capture(pitch("C4"), 1.0, Instrument::Keys, 11.25);
        recorder.close_duration(pitch("C4"), 11.75);
        recorder.stop();
        recorder
    }

    #[test]
    fn test_capture_times_are_relative_to_start() {
        let recording = sample_take().export();
        assert_eq!(
            recording.events,
            vec![
                NoteEvent { pitch: pitch("C4"), on_time_seconds: 0.0, duration_seconds: Some(1.0), velocity: 0.8, instrument: Instrument::Piano },
                NoteEvent { pitch: pitch("E4"), on_time_seconds: 0.5, duration_seconds: None, velocity: 0.6, instrument: Instrument::Piano },
                NoteEvent { pitch: pitch("C4"), on_time_seconds: 1.25, duration_seconds: Some(0.5), velocity: 1.0, instrument: Instrument::Keys },
            ]
        );
    }

    #[test]
    fn test_idle_recorder_ignores_capture() {
        let mut recorder = Recorder::new();
        recorder.capture(pitch("C4"), 0.8, Instrument::Piano, 1.0);
        recorder.close_duration(pitch("C4"), 2.0);
        assert_eq!(recorder.event_count(), 0);
    }

    #[test]
    fn test_close_without_open_event_is_noop() {
        let mut recorder = Recorder::new();
        recorder.start(0.0);
        recorder.close_duration(pitch("G4"), 1.0);
        assert_eq!(recorder.event_count(), 0);
    }

    #[test]
    fn test_newest_and_oldest_close_different_events() {
        let mut recorder = Recorder::new();
        recorder.start(0.0);
        recorder.capture(pitch("E4"), 0.8, Instrument::Piano, 0.0);
        recorder.capture(pitch("E4"), 0.8, Instrument::Piano, 0.5);
        recorder.close_oldest(pitch("E4"), 1.0);
        recorder.close_duration(pitch("E4"), 1.5);
        let durations: Vec<_> = recorder.export().events.iter().map(|e| e.duration_seconds).collect();
        assert_eq!(durations, vec![Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_start_clears_and_stop_keeps() {
        let mut recorder = sample_take();
        assert_eq!(recorder.event_count(), 3);
        recorder.stop();
        assert_eq!(recorder.event_count(), 3);
        recorder.start(50.0);
        assert_eq!(recorder.event_count(), 0);
        assert!(recorder.is_recording());
    }

    #[test]
    fn test_export_is_a_snapshot() {
        let mut recorder = Recorder::new();
        recorder.start(0.0);
        recorder.capture(pitch("A4"), 0.8, Instrument::Piano, 0.1);
        let snapshot = recorder.export();
        recorder.close_duration(pitch("A4"), 0.4);
        recorder.capture(pitch("B4"), 0.8, Instrument::Piano, 0.5);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.events[0].duration_seconds, None);
    }

    #[test]
    fn test_yaml_and_json_round_trip() {
        let recording = sample_take().export();
        let yaml = recording.to_yaml().unwrap();
        assert_eq!(Recording::from_yaml(&yaml).unwrap(), recording);
        let json = recording.to_json().unwrap();
        assert_eq!(Recording::from_json(&json).unwrap(), recording);
    }

    #[test]
    fn test_import_replaces_and_forces_idle() {
        let mut recorder = Recorder::new();
        recorder.start(0.0);
        recorder.capture(pitch("D4"), 0.8, Instrument::Piano, 0.0);
        recorder.import(sample_take().export());
        assert!(!recorder.is_recording());
        assert_eq!(recorder.export(), sample_take().export());
    }

    #[test]
    fn test_legacy_field_names_accepted() {
        let json = r#"[{"time": 0.5, "note": "C#4", "velocity": 0.7, "instrument": "keys"}]"#;
        let recording = Recording::from_json(json).unwrap();
        assert_eq!(recording.events[0].pitch, pitch("C#4"));
        assert_eq!(recording.events[0].duration_seconds, None);
        assert_eq!(recording.events[0].instrument, Instrument::Keys);
    }

    #[test]
    fn test_malformed_payloads_rejected() {
        let cases = [
            "not: a list",
            "- pitch: H9\n  onTimeSeconds: 0\n  velocity: 0.5\n  instrumentId: piano\n",
            "- pitch: C4\n  onTimeSeconds: -1\n  velocity: 0.5\n  instrumentId: piano\n",
            "- pitch: C4\n  onTimeSeconds: 0\n  velocity: 1.5\n  instrumentId: piano\n",
            "- pitch: C4\n  onTimeSeconds: 0\n  durationSeconds: -0.2\n  velocity: 0.5\n  instrumentId: piano\n",
            "- pitch: C4\n  onTimeSeconds: 0\n  velocity: 0.5\n  instrumentId: banjo\n",
            "- pitch: C4\n  velocity: 0.5\n  instrumentId: piano\n",
        ];
        for source in cases {
            assert!(
                matches!(Recording::from_yaml(source), Err(KeybedError::ImportError(_))),
                "expected import error for {:?}",
                source
            );
        }
    }

    #[test]
    fn test_replay_schedules_relative_to_fresh_origin() {
        let mut recorder = sample_take();
        let mut device = SimulatedDevice::new();
        device.set_time(100.0);

        let status = recorder.replay(&mut device, 0.05);
        match status {
            ReplayStatus::Scheduled { finishes_at } => assert!((finishes_at - 101.8).abs() < 1e-9),
            ReplayStatus::Empty => panic!("expected a scheduled replay"),
        }
        assert!(recorder.is_replaying());

        // Triggers for 3 events, releases for the 2 closed ones, plus completion
        assert_eq!(device.pending_cues(), 6);
        device.set_time(100.0 + 0.05);
        assert_eq!(
            device.next_due(),
            Some(Cue::Trigger { pitch: pitch("C4"), velocity: 0.8, instrument: Instrument::Piano })
        );
        assert_eq!(device.next_due(), None);
        assert!(device.actions().iter().all(|a| !matches!(a, DeviceAction::Release { .. })));
    }

    #[test]
    fn test_replay_empty_completes_immediately() {
        let mut recorder = Recorder::new();
        let mut device = SimulatedDevice::new();
        assert_eq!(recorder.replay(&mut device, 0.05), ReplayStatus::Empty);
        assert_eq!(device.pending_cues(), 0);
        assert!(!recorder.is_replaying());
    }

    #[test]
    fn test_second_replay_cancels_first() {
        let mut recorder = sample_take();
        let mut device = SimulatedDevice::new();
        recorder.replay(&mut device, 0.05);
        recorder.replay(&mut device, 0.05);
        assert_eq!(device.pending_cues(), 6);
        recorder.cancel_replay(&mut device);
        assert_eq!(device.pending_cues(), 0);
        assert!(!recorder.is_replaying());
    }
}
