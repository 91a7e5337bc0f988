//! Musical pitch value type
//!
//! A pitch is an octave plus a semitone within it. The chip adapters turn a
//! pitch into their block/F-number register encoding; this module only
//! carries the value and its display form.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key names indexed by semitone, C-rooted.
const KEY_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B",
];

/// A note's pitch: octave and semitone within the octave.
///
/// Semitone 0 is C. Values outside `[0, 12)` are folded into range when the
/// pitch is encoded, so a pitch is never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pitch {
    /// Octave number; only the low three bits reach the chip's block field.
    pub octave: i32,
    /// Semitone within the octave, interpreted modulo 12.
    pub semitone: i32,
}

impl Pitch {
    /// Create a pitch from an octave and a semitone.
    pub fn new(octave: i32, semitone: i32) -> Self {
        Pitch { octave, semitone }
    }

    /// Semitone folded into `[0, 12)`.
    pub(crate) fn semitone_index(&self) -> usize {
        self.semitone.rem_euclid(12) as usize
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", KEY_NAMES[self.semitone_index()], self.octave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Pitch::new(4, 9).to_string(), "A4");
        assert_eq!(Pitch::new(3, 6).to_string(), "F#3");
        assert_eq!(Pitch::new(0, 0).to_string(), "C0");
    }

    #[test]
    fn test_semitone_folding() {
        assert_eq!(Pitch::new(4, 12).semitone_index(), 0);
        assert_eq!(Pitch::new(4, 13).semitone_index(), 1);
        assert_eq!(Pitch::new(4, -1).semitone_index(), 11);
    }
}
