//! Chord detection from the set of sounding pitches
//!
//! Classifies the held pitch classes against a fixed table of interval sets
//! (sevenths before triads) and names the chord by root and quality.

use crate::pitch::{Pitch, PITCH_CLASS_NAMES};

/// Chord qualities in detection priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordQuality {
    Dominant7,
    Minor7,
    Major7,
    Major,
    Minor,
    Diminished,
    Augmented,
}

impl ChordQuality {
    /// Every quality, highest priority first
    pub const PRIORITY: [ChordQuality; 7] = [
        ChordQuality::Dominant7,
        ChordQuality::Minor7,
        ChordQuality::Major7,
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
    ];

    /// Semitone intervals above the root
    ///
    /// - minor 3rd = 3, major 3rd = 4, diminished 5th = 6, perfect 5th = 7,
    ///   augmented 5th = 8, minor 7th = 10, major 7th = 11
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Dominant7 => "7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Major => "maj",
            ChordQuality::Minor => "min",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
        }
    }
}

/// A detected chord: root pitch class plus quality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chord {
    pub root: u8,
    pub quality: ChordQuality,
}

impl Chord {
    /// Label such as `Cmaj7`, `G7`, `Amin`
    pub fn label(&self) -> String {
        format!("{}{}", PITCH_CLASS_NAMES[self.root as usize], self.quality.suffix())
    }
}

/// Classify a collection of pitches.
///
/// Roots are tried in ascending pitch-class order and, for each root, qualities
/// in priority order; the first root whose interval set contains a pattern wins.
/// Fewer than three distinct pitch classes never form a chord.
pub fn classify<'a, I>(pitches: I) -> Option<Chord>
where
    I: IntoIterator<Item = &'a Pitch>,
{
    // Bitmask of present pitch classes
    let mut classes: u16 = 0;
    for pitch in pitches {
        classes |= 1 << pitch.pitch_class();
    }
    if classes.count_ones() < 3 {
        return None;
    }

    for root in 0..12u8 {
        if classes & (1 << root) == 0 {
            continue;
        }
        // Rotate so the root sits at interval 0
        let relative = ((classes >> root) | (classes << (12 - root))) & 0x0FFF;
        for quality in ChordQuality::PRIORITY {
            if quality.intervals().iter().all(|i| relative & (1 << i) != 0) {
                return Some(Chord { root, quality });
            }
        }
    }
    None
}

/// Chord label for a collection of pitches, or `None`
///
/// # Examples
/// ```
/// use keybed::chord::detect_chord;
/// use keybed::Pitch;
///
/// let held: Vec<Pitch> = ["G3", "B3", "D4", "F4"].iter().map(|n| n.parse().unwrap()).collect();
/// assert_eq!(detect_chord(&held), Some("G7".to_string()));
/// ```
pub fn detect_chord<'a, I>(pitches: I) -> Option<String>
where
    I: IntoIterator<Item = &'a Pitch>,
{
    classify(pitches).map(|chord| chord.label())
}
