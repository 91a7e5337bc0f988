//! FM instrument parameter types
//!
//! Plain value types describing a four-operator FM patch: per-operator
//! envelope rates and levels plus the voice-level algorithm, feedback, and
//! LFO settings. Fields hold full `u8` values; each is masked to its
//! declared register width at packing time, never rejected.
//!
//! Serialization uses camelCase field names (`ssgEg`, `lfoFreq`), matching
//! the JSON documents produced by existing patch editors, so exported
//! patches load unchanged.

use serde::{Deserialize, Serialize};

/// Parameters of one FM operator.
///
/// Register widths: `ar`/`dr`/`sr` 5 bits, `rr`/`sl`/`ml`/`ssg_eg` 4 bits,
/// `tl` 7 bits, `ks` 2 bits, `dt` 3 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmOperator {
    /// Attack rate.
    pub ar: u8,
    /// Decay rate.
    pub dr: u8,
    /// Sustain rate (second decay).
    pub sr: u8,
    /// Release rate.
    pub rr: u8,
    /// Sustain level.
    pub sl: u8,
    /// Total level (attenuation).
    pub tl: u8,
    /// Key scale.
    pub ks: u8,
    /// Frequency multiplier.
    pub ml: u8,
    /// Detune.
    pub dt: u8,
    /// SSG-EG envelope mode.
    pub ssg_eg: u8,
    /// Amplitude modulation enable.
    pub am: bool,
}

/// A complete four-operator FM patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmInstrument {
    /// Algorithm (operator connection), 3 bits.
    pub al: u8,
    /// Operator-1 feedback, 3 bits.
    pub fb: u8,
    /// The four operators, in slot order.
    pub op: [FmOperator; 4],
    /// LFO frequency, 4 bits.
    pub lfo_freq: u8,
    /// Amplitude modulation sensitivity, 2 bits.
    pub ams: u8,
    /// Phase modulation sensitivity, 3 bits.
    pub pms: u8,
}
