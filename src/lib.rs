pub mod chord;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod keymap;
pub mod pitch;
pub mod recorder;
pub mod trainer;
pub mod voice;

pub use chord::detect_chord;
pub use config::EngineConfig;
pub use device::{Cue, CueToken, DeviceAction, Instrument, SimulatedDevice, SoundDevice};
pub use engine::{Engine, EngineStatus};
pub use error::*;
pub use pitch::Pitch;
pub use recorder::{NoteEvent, Recorder, Recording, ReplayStatus};
pub use trainer::{BeatRange, Classification, Lesson, PracticeOptions, Trainer, TrainerState, TrainerStatus};

/// Detect the chord formed by a list of pitch names.
/// Fails on the first malformed name.
pub fn chord_of(names: &[&str]) -> Result<Option<String>, KeybedError> {
    let pitches = names
        .iter()
        .map(|name| name.parse::<Pitch>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(detect_chord(&pitches))
}
