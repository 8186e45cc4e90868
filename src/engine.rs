//! # Note-Event Engine
//!
//! The orchestrator. Input adapters call [`Engine::note_on`] and
//! [`Engine::note_off`] with already-resolved pitch names; the engine runs the
//! result through the voice tracker, recomputes the chord label, records the
//! note and hands it to the lesson grader, in that order.
//!
//! ## Time
//! The engine keeps no clock of its own. Every timestamp is read from the
//! [`SoundDevice`], and every delayed effect (replayed notes, lesson steps, loop
//! restarts) is a [`Cue`] the device hands back through [`Engine::tick`].
//!
//! ## Silent mode
//! The first time the device fails to trigger or release, the engine logs a
//! warning and stops actuating sound. Voices, recording and grading carry on,
//! since they only depend on logical time.
//!
//! ## Example
//! ```rust
//! use keybed::{Engine, SimulatedDevice};
//!
//! let mut engine = Engine::new(SimulatedDevice::new());
//! engine.note_on("C4", None, Some("z")).unwrap();
//! engine.note_on("E4", None, Some("c")).unwrap();
//! engine.note_on("G4", None, Some("b")).unwrap();
//! assert_eq!(engine.chord(), Some("Cmaj"));
//!
//! engine.note_off("E4", Some("c")).unwrap();
//! assert_eq!(engine.chord(), None);
//! ```

use std::collections::VecDeque;

use log::{debug, warn};
use serde::Serialize;

use crate::chord::detect_chord;
use crate::config::EngineConfig;
use crate::device::{Cue, Instrument, SimulatedDevice, SoundDevice};
use crate::error::KeybedError;
use crate::pitch::Pitch;
use crate::recorder::{Recorder, Recording, ReplayStatus};
use crate::trainer::{DemoSound, Lesson, PracticeOptions, Trainer, TrainerStatus};
use crate::voice::{PressOutcome, ReleaseOutcome, SourceId, VoiceTracker};

/// Read-only snapshot for UI collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    /// Sounding pitches, lowest first
    pub voices: Vec<String>,
    pub chord: Option<String>,
    /// Most recent first
    pub recent_notes: Vec<String>,
    pub polyphony: usize,
    pub sustain: bool,
    pub transpose: i32,
    pub octave: i32,
    pub instrument: Instrument,
    pub is_recording: bool,
    pub event_count: usize,
    pub is_replaying: bool,
    pub silent: bool,
    pub trainer: TrainerStatus,
}

pub struct Engine<D: SoundDevice> {
    device: D,
    config: EngineConfig,
    transpose: i32,
    octave: i32,
    instrument: Instrument,
    silent: bool,
    voices: VoiceTracker,
    chord: Option<String>,
    recent: VecDeque<Pitch>,
    recorder: Recorder,
    /// Replayed pitches triggered and not yet released
    replay_sounding: Vec<(Pitch, Instrument)>,
    trainer: Trainer,
}

impl<D: SoundDevice> Engine<D> {
    pub fn new(device: D) -> Self {
        Self::build(device, EngineConfig::default())
    }

    pub fn with_config(device: D, config: EngineConfig) -> Result<Self, KeybedError> {
        config.validate()?;
        Ok(Self::build(device, config))
    }

    fn build(device: D, config: EngineConfig) -> Self {
        Self {
            device,
            trainer: Trainer::new(config.clone()),
            recent: VecDeque::with_capacity(config.recent_notes),
            config,
            transpose: 0,
            octave: 0,
            instrument: Instrument::default(),
            silent: false,
            voices: VoiceTracker::new(),
            chord: None,
            recorder: Recorder::new(),
            replay_sounding: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    // ----- live input -----

    /// Press `name` on behalf of `source`.
    ///
    /// Without a source identifier the pressed pitch name (before transpose)
    /// identifies the input, so a matching `note_off(name, None)` releases it.
    /// A repeat press from a bound source does nothing.
    pub fn note_on(&mut self, name: &str, velocity: Option<f32>, source: Option<&str>) -> Result<(), KeybedError> {
        let pressed: Pitch = name.parse()?;
        let velocity = match velocity {
            Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
            _ => self.config.default_velocity,
        };
        let id = source.map(SourceId::new).unwrap_or_else(|| SourceId::for_pitch(pressed));
        let pitch = pressed.transpose(self.transpose + 12 * self.octave);

        let now = self.device.now();
        match self.voices.note_down(id, pitch, velocity) {
            PressOutcome::Repeat => {
                debug!("repeat press for {} ignored", name);
                return Ok(());
            }
            PressOutcome::Retriggered(pitch) => self.recorder.close_duration(pitch, now),
            PressOutcome::Sounded(_) => {}
        }

        self.trigger_sound(pitch, velocity, self.instrument);
        self.recompute_chord();
        self.push_recent(pitch);

        self.recorder.capture(pitch, velocity, self.instrument, now);
        if let Some(verdict) = self.trainer.on_live_note_on(pitch, now) {
            debug!("{} graded {:?}", pitch, verdict);
        }
        Ok(())
    }

    /// Release whatever `source` (or the pitch name, without one) is holding.
    ///
    /// The sounding pitch comes from the binding made at press time, so a
    /// transpose change while the key is down has no effect here.
    pub fn note_off(&mut self, name: &str, source: Option<&str>) -> Result<(), KeybedError> {
        let released: Pitch = name.parse()?;
        let id = source.map(SourceId::new).unwrap_or_else(|| SourceId::for_pitch(released));

        match self.voices.note_up(&id) {
            Ok(ReleaseOutcome::Released(pitch)) => self.end_voice(pitch),
            Ok(ReleaseOutcome::Sustained(pitch)) => debug!("{} held by sustain", pitch),
            Ok(ReleaseOutcome::StillHeld(pitch)) => {
                debug!("{} still held by another input", pitch);
                let now = self.device.now();
                self.recorder.close_oldest(pitch, now);
            }
            Err(KeybedError::UnsupportedInput(id)) => {
                debug!("spurious release from '{}' ignored", id);
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        self.recompute_chord();
        Ok(())
    }

    /// Press or lift the sustain pedal. Lifting releases every pitch the
    /// pedal was holding, once each.
    pub fn set_sustain(&mut self, on: bool) {
        let released = self.voices.set_sustain(on);
        if released.is_empty() {
            return;
        }
        for pitch in released {
            self.end_voice(pitch);
        }
        self.recompute_chord();
    }

    pub fn sustain(&self) -> bool {
        self.voices.sustain()
    }

    /// Stop sounding `pitch` and close its recorded duration
    fn end_voice(&mut self, pitch: Pitch) {
        self.release_sound(pitch, self.instrument);
        let now = self.device.now();
        self.recorder.close_duration(pitch, now);
    }

    fn recompute_chord(&mut self) {
        self.chord = detect_chord(self.voices.voices());
    }

    fn push_recent(&mut self, pitch: Pitch) {
        self.recent.push_front(pitch);
        self.recent.truncate(self.config.recent_notes);
    }

    // ----- performance settings -----

    /// Set the global transpose, clamped to the configured limit. Applies to
    /// later presses only.
    pub fn set_transpose(&mut self, semitones: i32) -> i32 {
        let limit = self.config.transpose_limit;
        self.transpose = semitones.clamp(-limit, limit);
        self.transpose
    }

    pub fn transpose(&self) -> i32 {
        self.transpose
    }

    pub fn set_octave(&mut self, octaves: i32) -> i32 {
        let limit = self.config.octave_limit;
        self.octave = octaves.clamp(-limit, limit);
        self.octave
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn set_instrument(&mut self, instrument: Instrument) {
        self.instrument = instrument;
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    // ----- recording -----

    pub fn start_recording(&mut self) {
        let now = self.device.now();
        self.recorder.start(now);
    }

    pub fn stop_recording(&mut self) {
        self.recorder.stop();
    }

    pub fn clear_recording(&mut self) {
        self.recorder.clear();
    }

    pub fn export_recording(&self) -> Recording {
        self.recorder.export()
    }

    /// Replace the recording. Fails without touching the current one when
    /// `recording` is not valid.
    pub fn import_recording(&mut self, recording: Recording) -> Result<(), KeybedError> {
        recording.validate()?;
        self.recorder.import(recording);
        Ok(())
    }

    pub fn import_yaml(&mut self, source: &str) -> Result<(), KeybedError> {
        let recording = Recording::from_yaml(source)?;
        self.import_recording(recording)
    }

    pub fn import_json(&mut self, source: &str) -> Result<(), KeybedError> {
        let recording = Recording::from_json(source)?;
        self.import_recording(recording)
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Schedule the recording on the device. Replaces any replay in flight.
    pub fn replay_recording(&mut self) -> ReplayStatus {
        self.stop_replay();
        self.recorder.replay(&mut self.device, self.config.replay_lead)
    }

    /// Cancel the replay and silence whatever it left sounding
    pub fn stop_replay(&mut self) {
        self.recorder.cancel_replay(&mut self.device);
        for (pitch, instrument) in std::mem::take(&mut self.replay_sounding) {
            self.release_sound(pitch, instrument);
        }
    }

    // ----- lessons -----

    /// Start practising `lesson`. Any session already running is cancelled
    /// first and its demonstration notes are silenced.
    pub fn start_lesson(&mut self, lesson: Lesson, options: PracticeOptions) -> Result<(), KeybedError> {
        let silenced = self.trainer.cancel(&mut self.device);
        self.play_demo(silenced);
        let silenced = self.trainer.start(&mut self.device, lesson, options)?;
        self.play_demo(silenced);
        Ok(())
    }

    pub fn stop_lesson(&mut self) {
        let silenced = self.trainer.cancel(&mut self.device);
        self.play_demo(silenced);
    }

    pub fn trainer(&self) -> &Trainer {
        &self.trainer
    }

    fn play_demo(&mut self, sounds: Vec<DemoSound>) {
        for sound in sounds {
            match sound {
                DemoSound::Trigger { pitch, velocity } => self.trigger_sound(pitch, velocity, self.instrument),
                DemoSound::Release { pitch } => self.release_sound(pitch, self.instrument),
            }
        }
    }

    // ----- transport -----

    /// Dispatch every cue the device reports as due
    pub fn tick(&mut self) {
        while let Some(cue) = self.device.next_due() {
            self.dispatch(cue);
        }
    }

    fn dispatch(&mut self, cue: Cue) {
        match cue {
            Cue::Trigger { pitch, velocity, instrument } => {
                self.replay_sounding.push((pitch, instrument));
                self.trigger_sound(pitch, velocity, instrument);
            }
            Cue::Release { pitch, instrument } => {
                if let Some(pos) = self.replay_sounding.iter().position(|s| *s == (pitch, instrument)) {
                    self.replay_sounding.remove(pos);
                }
                self.release_sound(pitch, instrument);
            }
            Cue::ReplayFinished => {
                self.replay_sounding.clear();
                self.recorder.replay_finished();
            }
            Cue::StepMarker { .. } | Cue::StepTrigger { .. } | Cue::StepRelease { .. } | Cue::LessonEnd => {
                let sounds = self.trainer.on_cue(&mut self.device, &cue);
                self.play_demo(sounds);
            }
        }
    }

    fn trigger_sound(&mut self, pitch: Pitch, velocity: f32, instrument: Instrument) {
        if self.silent {
            return;
        }
        if let Err(e) = self.device.trigger(pitch, velocity, instrument) {
            self.go_silent(e);
        }
    }

    fn release_sound(&mut self, pitch: Pitch, instrument: Instrument) {
        if self.silent {
            return;
        }
        if let Err(e) = self.device.release(pitch, instrument) {
            self.go_silent(e);
        }
    }

    fn go_silent(&mut self, error: KeybedError) {
        warn!("{}; continuing without sound", error);
        self.silent = true;
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    // ----- status -----

    /// Sounding pitches, lowest first
    pub fn voices(&self) -> Vec<Pitch> {
        let mut voices = self.voices.voices().to_vec();
        voices.sort();
        voices
    }

    pub fn chord(&self) -> Option<&str> {
        self.chord.as_deref()
    }

    /// Most recent first
    pub fn recent_notes(&self) -> impl Iterator<Item = Pitch> + '_ {
        self.recent.iter().copied()
    }

    pub fn status(&self) -> EngineStatus {
        let voices = self.voices();
        EngineStatus {
            polyphony: voices.len(),
            voices: voices.iter().map(|p| p.name()).collect(),
            chord: self.chord.clone(),
            recent_notes: self.recent.iter().map(|p| p.name()).collect(),
            sustain: self.voices.sustain(),
            transpose: self.transpose,
            octave: self.octave,
            instrument: self.instrument,
            is_recording: self.recorder.is_recording(),
            event_count: self.recorder.event_count(),
            is_replaying: self.recorder.is_replaying(),
            silent: self.silent,
            trainer: self.trainer.status(),
        }
    }
}

impl Engine<SimulatedDevice> {
    /// Move the simulated clock to `time`, firing every cue due on the way at
    /// its own time.
    pub fn run_until(&mut self, time: f64) {
        while let Some(at) = self.device.next_cue_time() {
            if at > time {
                break;
            }
            self.device.set_time(at);
            self.tick();
        }
        self.device.set_time(time);
        debug!("transport at {:.3}s", time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceAction;
    use pretty_assertions::assert_eq;

    fn pitch(name: &str) -> Pitch {
        name.parse().unwrap()
    }

    fn engine() -> Engine<SimulatedDevice> {
        Engine::new(SimulatedDevice::new())
    }

    fn triggers(engine: &Engine<SimulatedDevice>) -> usize {
        engine
            .device()
            .actions()
            .iter()
            .filter(|a| matches!(a, DeviceAction::Trigger { .. }))
            .count()
    }

    fn releases_of(engine: &Engine<SimulatedDevice>, target: Pitch) -> usize {
        engine
            .device()
            .actions()
            .iter()
            .filter(|a| matches!(a, DeviceAction::Release { pitch, .. } if *pitch == target))
            .count()
    }

    #[test]
    fn test_idempotent_press() {
        let mut engine = engine();
        engine.note_on("C4", Some(0.9), Some("k1")).unwrap();
        engine.note_on("C4", Some(0.9), Some("k1")).unwrap();

        assert_eq!(triggers(&engine), 1);
        assert_eq!(engine.voices(), vec![pitch("C4")]);
        assert_eq!(engine.recent_notes().count(), 1);
    }

    #[test]
    fn test_default_velocity_and_clamping() {
        let mut engine = engine();
        engine.note_on("C4", None, None).unwrap();
        engine.note_on("D4", Some(4.0), None).unwrap();
        let velocities: Vec<f32> = engine
            .device()
            .actions()
            .iter()
            .filter_map(|a| match a {
                DeviceAction::Trigger { velocity, .. } => Some(*velocity),
                _ => None,
            })
            .collect();
        assert_eq!(velocities, vec![0.8, 1.0]);
    }

    #[test]
    fn test_release_without_source_matches_pitch_name() {
        let mut engine = engine();
        engine.set_transpose(2);
        engine.note_on("C4", None, None).unwrap();
        assert_eq!(engine.voices(), vec![pitch("D4")]);

        engine.note_off("C4", None).unwrap();
        assert!(engine.voices().is_empty());
        assert_eq!(releases_of(&engine, pitch("D4")), 1);
    }

    #[test]
    fn test_transpose_is_captured_at_press_time() {
        let mut engine = engine();
        engine.note_on("C4", None, Some("z")).unwrap();
        engine.set_transpose(5);
        engine.set_octave(1);
        engine.note_off("C4", Some("z")).unwrap();

        assert_eq!(releases_of(&engine, pitch("C4")), 1);
        assert!(engine.voices().is_empty());
    }

    #[test]
    fn test_transpose_and_octave_are_clamped() {
        let mut engine = engine();
        assert_eq!(engine.set_transpose(20), 12);
        assert_eq!(engine.set_transpose(-13), -12);
        assert_eq!(engine.set_octave(3), 2);
        assert_eq!(engine.set_octave(-1), -1);

        engine.set_transpose(1);
        engine.note_on("C4", None, None).unwrap();
        // C4 + 1 - 12
        assert_eq!(engine.voices(), vec![pitch("C#3")]);
    }

    #[test]
    fn test_reference_counted_release() {
        let mut engine = engine();
        engine.note_on("E4", None, Some("mouse")).unwrap();
        engine.note_on("E4", None, Some("c")).unwrap();
        engine.note_off("E4", Some("mouse")).unwrap();
        assert_eq!(engine.voices(), vec![pitch("E4")]);
        assert_eq!(releases_of(&engine, pitch("E4")), 0);

        engine.note_off("E4", Some("c")).unwrap();
        assert!(engine.voices().is_empty());
        assert_eq!(releases_of(&engine, pitch("E4")), 1);
    }

    #[test]
    fn test_sustain_releases_once() {
        let mut engine = engine();
        engine.set_sustain(true);
        engine.note_on("C4", None, Some("z")).unwrap();
        engine.note_off("C4", Some("z")).unwrap();
        assert_eq!(engine.voices(), vec![pitch("C4")]);
        assert_eq!(releases_of(&engine, pitch("C4")), 0);

        engine.set_sustain(false);
        assert!(engine.voices().is_empty());
        assert_eq!(releases_of(&engine, pitch("C4")), 1);

        engine.set_sustain(false);
        assert_eq!(releases_of(&engine, pitch("C4")), 1);
    }

    #[test]
    fn test_chord_follows_voices() {
        let mut engine = engine();
        for (name, key) in [("G3", "a"), ("B3", "b"), ("D4", "c"), ("F4", "d")] {
            engine.note_on(name, None, Some(key)).unwrap();
        }
        assert_eq!(engine.chord(), Some("G7"));
        engine.note_off("F4", Some("d")).unwrap();
        assert_eq!(engine.chord(), Some("Gmaj"));
        engine.note_off("D4", Some("c")).unwrap();
        assert_eq!(engine.chord(), None);
    }

    #[test]
    fn test_recent_notes_ring_is_bounded() {
        let mut engine = engine();
        for (i, name) in ["C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5", "D5", "E5"].iter().enumerate() {
            let key = format!("k{}", i);
            engine.note_on(name, None, Some(&key)).unwrap();
            engine.note_off(name, Some(&key)).unwrap();
        }
        let recent: Vec<String> = engine.recent_notes().map(|p| p.name()).collect();
        assert_eq!(recent, vec!["E5", "D5", "C5", "B4", "A4", "G4", "F4", "E4"]);
    }

    #[test]
    fn test_malformed_pitch_leaves_state_intact() {
        let mut engine = engine();
        engine.start_recording();
        engine.note_on("C4", None, Some("z")).unwrap();
        let before = engine.status();

        let result = engine.note_on("H4", None, Some("x"));
        assert!(matches!(result, Err(KeybedError::ParseError { .. })));
        let result = engine.note_off("C", Some("z"));
        assert!(matches!(result, Err(KeybedError::ParseError { .. })));

        assert_eq!(engine.status(), before);
        assert_eq!(triggers(&engine), 1);
    }

    #[test]
    fn test_spurious_release_is_ignored() {
        let mut engine = engine();
        assert!(engine.note_off("C4", Some("never-pressed")).is_ok());
        assert!(engine.device().actions().is_empty());
    }

    #[test]
    fn test_silent_mode_keeps_state() {
        let mut engine = engine();
        engine.start_recording();
        engine.device_mut().set_unavailable(true);

        engine.note_on("C4", None, Some("z")).unwrap();
        assert!(engine.is_silent());
        engine.device_mut().set_unavailable(false);
        engine.note_on("E4", None, Some("c")).unwrap();

        // Nothing reaches the device once silent
        assert!(engine.device().actions().is_empty());
        assert_eq!(engine.voices(), vec![pitch("C4"), pitch("E4")]);
        let status = engine.status();
        assert!(status.silent);
        assert_eq!(status.event_count, 2);
    }

    #[test]
    fn test_recording_durations_close_on_release() {
        let mut engine = engine();
        engine.device_mut().set_time(5.0);
        engine.start_recording();
        engine.set_sustain(true);
        engine.note_on("C4", None, Some("z")).unwrap();
        engine.device_mut().set_time(5.5);
        engine.note_off("C4", Some("z")).unwrap();
        engine.device_mut().set_time(6.0);
        engine.set_sustain(false);
        engine.stop_recording();

        let events = engine.export_recording().events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].on_time_seconds, 0.0);
        assert_eq!(events[0].duration_seconds, Some(1.0));
    }

    fn durations(engine: &Engine<SimulatedDevice>) -> Vec<(f64, Option<f64>)> {
        engine
            .export_recording()
            .events
            .iter()
            .map(|e| (e.on_time_seconds, e.duration_seconds))
            .collect()
    }

    #[test]
    fn test_shared_pitch_recording_closes_every_press() {
        let mut engine = engine();
        engine.start_recording();
        engine.note_on("E4", None, Some("mouse")).unwrap();
        engine.device_mut().set_time(0.5);
        engine.note_on("E4", None, Some("c")).unwrap();
        engine.device_mut().set_time(1.0);
        engine.note_off("E4", Some("mouse")).unwrap();
        engine.device_mut().set_time(1.5);
        engine.note_off("E4", Some("c")).unwrap();
        engine.stop_recording();

        assert_eq!(durations(&engine), vec![(0.0, Some(1.0)), (0.5, Some(1.0))]);
        assert_eq!(releases_of(&engine, pitch("E4")), 1);
        assert!(engine.voices().is_empty());
    }

    #[test]
    fn test_repress_under_sustain_closes_previous_event() {
        let mut engine = engine();
        engine.start_recording();
        engine.set_sustain(true);
        engine.note_on("C4", None, Some("a")).unwrap();
        engine.device_mut().set_time(0.5);
        engine.note_off("C4", Some("a")).unwrap();
        engine.device_mut().set_time(1.0);
        engine.note_on("C4", None, Some("a")).unwrap();
        engine.device_mut().set_time(1.5);
        engine.set_sustain(false);
        assert_eq!(engine.voices(), vec![pitch("C4")]);
        engine.device_mut().set_time(2.0);
        engine.note_off("C4", Some("a")).unwrap();
        engine.stop_recording();

        assert_eq!(durations(&engine), vec![(0.0, Some(1.0)), (1.0, Some(1.0))]);
        assert_eq!(triggers(&engine), 2);
        assert_eq!(releases_of(&engine, pitch("C4")), 1);
    }

    #[test]
    fn test_failed_import_keeps_recording() {
        let mut engine = engine();
        engine.start_recording();
        engine.note_on("C4", None, None).unwrap();
        engine.stop_recording();
        let before = engine.export_recording();

        assert!(matches!(engine.import_yaml("- pitch: 12\n  bogus: 1\n"), Err(KeybedError::ImportError(_))));
        assert!(matches!(engine.import_json("[{\"pitch\": \"C4\"}]"), Err(KeybedError::ImportError(_))));
        assert_eq!(engine.export_recording(), before);
    }

    #[test]
    fn test_instrument_reaches_device_and_recording() {
        let mut engine = engine();
        engine.set_instrument(Instrument::Keys);
        engine.start_recording();
        engine.note_on("A4", None, None).unwrap();

        assert!(matches!(
            engine.device().actions()[0],
            DeviceAction::Trigger { instrument: Instrument::Keys, .. }
        ));
        assert_eq!(engine.export_recording().events[0].instrument, Instrument::Keys);
    }

    #[test]
    fn test_stop_replay_silences_replayed_notes() {
        let mut engine = engine();
        engine
            .import_yaml("- { pitch: C4, onTimeSeconds: 0.0, durationSeconds: 2.0, velocity: 0.8, instrumentId: piano }\n")
            .unwrap();
        engine.replay_recording();
        engine.run_until(0.5);
        assert!(engine.status().is_replaying);

        engine.stop_replay();
        assert!(!engine.status().is_replaying);
        assert_eq!(releases_of(&engine, pitch("C4")), 1);
        assert_eq!(engine.device().pending_cues(), 0);
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let mut engine = engine();
        engine.note_on("C4", None, None).unwrap();
        let json = serde_json::to_value(engine.status()).unwrap();
        assert_eq!(json["voices"][0], "C4");
        assert_eq!(json["recentNotes"][0], "C4");
        assert_eq!(json["isRecording"], false);
        assert_eq!(json["trainer"]["state"], "idle");
    }
}
