//! # Pitch Model
//!
//! Canonical pitch representation shared by every other module.
//!
//! A [`Pitch`] is a semitone index on the MIDI scale (`C-1` = 0, `C4` = 60) with a
//! canonical sharp-only name (`"C4"`, `"C#4"`). The model itself enforces no range:
//! transposition is plain integer addition, and clamping is left to callers.
//!
//! ## Example
//! ```rust
//! use keybed::pitch::{name_of, number_of, transpose};
//!
//! assert_eq!(number_of("C4").unwrap(), 60);
//! assert_eq!(name_of(61), "C#4");
//! assert_eq!(name_of(transpose(60, -13)), "B2");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeybedError;

/// Pitch-class names, indexed by `number mod 12`
pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A playable pitch as a MIDI-style semitone index.
///
/// Serializes as its canonical name so recordings and lessons stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch(i32);

impl Pitch {
    pub const fn from_number(number: i32) -> Self {
        Pitch(number)
    }

    pub const fn number(self) -> i32 {
        self.0
    }

    /// Octave-independent pitch class in `0..12`
    pub fn pitch_class(self) -> u8 {
        self.0.rem_euclid(12) as u8
    }

    pub fn transpose(self, semitones: i32) -> Pitch {
        Pitch(transpose(self.0, semitones))
    }

    pub fn name(self) -> String {
        name_of(self.0)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let octave = self.0.div_euclid(12) - 1;
        write!(f, "{}{}", PITCH_CLASS_NAMES[self.pitch_class() as usize], octave)
    }
}

impl FromStr for Pitch {
    type Err = KeybedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        number_of(s).map(Pitch)
    }
}

impl TryFrom<String> for Pitch {
    type Error = KeybedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pitch> for String {
    fn from(pitch: Pitch) -> Self {
        pitch.to_string()
    }
}

fn parse_error(input: &str, message: impl Into<String>) -> KeybedError {
    KeybedError::ParseError {
        input: input.to_string(),
        message: message.into(),
    }
}

/// Convert a pitch name (`[A-G]#?-?\d+`) to its semitone number.
///
/// Only canonical octave spellings are accepted: no leading zeros and no `-0`,
/// so that `name_of(number_of(name)) == name` for every accepted name.
pub fn number_of(name: &str) -> Result<i32, KeybedError> {
    let mut chars = name.chars();
    let letter = chars.next().ok_or_else(|| parse_error(name, "empty pitch name"))?;
    let base: i32 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        other => return Err(parse_error(name, format!("unknown note letter '{}'", other))),
    };

    let rest = chars.as_str();
    let (sharp, octave_text) = match rest.strip_prefix('#') {
        Some(after) => (1, after),
        None => (0, rest),
    };
    // E# and B# are not canonical names
    if sharp == 1 && (letter == 'E' || letter == 'B') {
        return Err(parse_error(name, format!("'{}#' is not a pitch name", letter)));
    }

    let digits = octave_text.strip_prefix('-').unwrap_or(octave_text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(parse_error(name, "expected an octave number"));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(parse_error(name, "octave has leading zeros"));
    }
    if octave_text.starts_with('-') && digits == "0" {
        return Err(parse_error(name, "octave -0 is not canonical"));
    }

    let octave: i32 = octave_text
        .parse()
        .map_err(|_| parse_error(name, "octave out of range"))?;

    octave
        .checked_add(1)
        .and_then(|o| o.checked_mul(12))
        .and_then(|n| n.checked_add(base + sharp))
        .ok_or_else(|| parse_error(name, "octave out of range"))
}

/// Canonical name for a semitone number.
pub fn name_of(number: i32) -> String {
    Pitch(number).to_string()
}

/// Shift a pitch number by a number of semitones. No clamping.
pub fn transpose(number: i32, semitones: i32) -> i32 {
    number + semitones
}
