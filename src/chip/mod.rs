//! Chip adapters
//!
//! One adapter per supported chip variant translates semantic operations
//! (key-on, key-off, instrument load, frame generation) into that chip's
//! register layout. The variant set is closed and exhaustively known, so
//! the single active chip is a tagged variant over the adapters rather
//! than an open trait object.

mod core;
mod opn;
mod ym2608;
mod ym2612;

pub use self::core::{CoreError, CoreFactory, FmCore, Frame};
pub use ym2608::Ym2608;
pub use ym2612::Ym2612;

use num_derive::FromPrimitive;

use crate::instrument::FmInstrument;
use crate::pitch::Pitch;
use crate::{Result, SynthError};

/// Identifier of a supported chip variant.
///
/// The discriminants match the ids used by external callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum ChipKind {
    /// YM2608 (OPNA).
    Ym2608 = 0,
    /// YM2612 (OPN2).
    Ym2612 = 1,
}

impl ChipKind {
    /// Resolve a caller-supplied variant id.
    ///
    /// Unknown ids fail without side effect.
    pub fn from_id(id: u8) -> Result<Self> {
        <Self as num_traits::FromPrimitive>::from_u8(id).ok_or(SynthError::UnsupportedChip(id))
    }
}

/// Uniform operation contract implemented by every chip variant.
pub trait ChipAdapter {
    /// Re-initialize chip state to silence. Idempotent.
    fn reset(&mut self) -> Result<()>;

    /// Native output rate for the variant's fixed master clock.
    fn sample_rate(&self) -> u32;

    /// Number of FM note channels the variant exposes.
    fn num_channels(&self) -> u8;

    /// Sound `pitch` on `channel`: frequency registers, then the key-on
    /// flag register.
    fn key_on(&mut self, channel: u8, pitch: Pitch) -> Result<()>;

    /// Release `channel`: key-on flag register with the slot gates cleared.
    fn key_off(&mut self, channel: u8) -> Result<()>;

    /// Load `instrument` uniformly onto every channel.
    fn set_instrument(&mut self, instrument: &FmInstrument) -> Result<()>;

    /// Produce `left.len()` stereo frames at the native rate, normalized
    /// to the symmetric float range.
    fn generate(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<()>;
}

/// The single active chip: one of the closed set of variants.
pub enum Chip {
    /// Active YM2608.
    Ym2608(Ym2608),
    /// Active YM2612.
    Ym2612(Ym2612),
}

impl Chip {
    /// Build the adapter for `kind` with an emulation core from `factory`.
    ///
    /// Fails without side effect when the factory has no core for the
    /// variant; otherwise the adapter comes up reset and ready.
    pub fn build(kind: ChipKind, factory: &dyn CoreFactory) -> Result<Self> {
        let core = factory
            .build(kind)
            .ok_or(SynthError::CoreUnavailable(kind))?;

        Ok(match kind {
            ChipKind::Ym2608 => Chip::Ym2608(Ym2608::new(core)),
            ChipKind::Ym2612 => Chip::Ym2612(Ym2612::new(core)),
        })
    }

    /// Which variant this chip is.
    pub fn kind(&self) -> ChipKind {
        match self {
            Chip::Ym2608(_) => ChipKind::Ym2608,
            Chip::Ym2612(_) => ChipKind::Ym2612,
        }
    }
}

impl ChipAdapter for Chip {
    fn reset(&mut self) -> Result<()> {
        match self {
            Chip::Ym2608(chip) => chip.reset(),
            Chip::Ym2612(chip) => chip.reset(),
        }
    }

    fn sample_rate(&self) -> u32 {
        match self {
            Chip::Ym2608(chip) => chip.sample_rate(),
            Chip::Ym2612(chip) => chip.sample_rate(),
        }
    }

    fn num_channels(&self) -> u8 {
        match self {
            Chip::Ym2608(chip) => chip.num_channels(),
            Chip::Ym2612(chip) => chip.num_channels(),
        }
    }

    fn key_on(&mut self, channel: u8, pitch: Pitch) -> Result<()> {
        match self {
            Chip::Ym2608(chip) => chip.key_on(channel, pitch),
            Chip::Ym2612(chip) => chip.key_on(channel, pitch),
        }
    }

    fn key_off(&mut self, channel: u8) -> Result<()> {
        match self {
            Chip::Ym2608(chip) => chip.key_off(channel),
            Chip::Ym2612(chip) => chip.key_off(channel),
        }
    }

    fn set_instrument(&mut self, instrument: &FmInstrument) -> Result<()> {
        match self {
            Chip::Ym2608(chip) => chip.set_instrument(instrument),
            Chip::Ym2612(chip) => chip.set_instrument(instrument),
        }
    }

    fn generate(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<()> {
        match self {
            Chip::Ym2608(chip) => chip.generate(left, right),
            Chip::Ym2612(chip) => chip.generate(left, right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_ids_match_binding_table() {
        assert_eq!(ChipKind::from_id(0).unwrap(), ChipKind::Ym2608);
        assert_eq!(ChipKind::from_id(1).unwrap(), ChipKind::Ym2612);
    }

    #[test]
    fn test_unknown_variant_id_fails() {
        assert!(matches!(
            ChipKind::from_id(7),
            Err(SynthError::UnsupportedChip(7))
        ));
    }
}
