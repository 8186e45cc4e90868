//! Computer keyboard layout
//!
//! Two playable rows: `z`..`/` from C4 and `a`..`;` from C5, with the sharps on
//! the rows above them. Adapters resolve a key here and pass the key itself as
//! the source identifier, so auto-repeat is absorbed by the engine.

const KEY_MAP: &[(char, &str)] = &[
    // lower row, C4 to E5
    ('z', "C4"),
    ('x', "D4"),
    ('c', "E4"),
    ('v', "F4"),
    ('b', "G4"),
    ('n', "A4"),
    ('m', "B4"),
    (',', "C5"),
    ('.', "D5"),
    ('/', "E5"),
    // home row, C5 to E6
    ('a', "C5"),
    ('s', "D5"),
    ('d', "E5"),
    ('f', "F5"),
    ('g', "G5"),
    ('h', "A5"),
    ('j', "B5"),
    ('k', "C6"),
    ('l', "D6"),
    (';', "E6"),
    // sharps
    ('1', "C#4"),
    ('2', "D#4"),
    ('4', "F#4"),
    ('5', "G#4"),
    ('6', "A#4"),
    ('q', "C#5"),
    ('w', "D#5"),
    ('e', "F#5"),
    ('t', "G#5"),
    ('y', "A#5"),
    ('u', "C#6"),
];

/// Pitch name bound to `key`, case-insensitive
pub fn pitch_for_key(key: char) -> Option<&'static str> {
    let key = key.to_ascii_lowercase();
    KEY_MAP.iter().find(|(k, _)| *k == key).map(|(_, name)| *name)
}

/// Every bound key with its pitch name
pub fn bindings() -> impl Iterator<Item = (char, &'static str)> {
    KEY_MAP.iter().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Pitch;
    use std::collections::HashSet;

    #[test]
    fn test_rows() {
        assert_eq!(pitch_for_key('z'), Some("C4"));
        assert_eq!(pitch_for_key('/'), Some("E5"));
        assert_eq!(pitch_for_key('a'), Some("C5"));
        assert_eq!(pitch_for_key(';'), Some("E6"));
        assert_eq!(pitch_for_key('u'), Some("C#6"));
    }

    #[test]
    fn test_case_insensitive_and_unbound() {
        assert_eq!(pitch_for_key('Z'), Some("C4"));
        assert_eq!(pitch_for_key('3'), None);
        assert_eq!(pitch_for_key(' '), None);
    }

    #[test]
    fn test_every_binding_is_a_valid_pitch() {
        let mut keys = HashSet::new();
        for (key, name) in bindings() {
            assert!(keys.insert(key), "duplicate key {:?}", key);
            assert!(name.parse::<Pitch>().is_ok(), "bad pitch {}", name);
        }
        assert_eq!(keys.len(), 31);
    }
}
