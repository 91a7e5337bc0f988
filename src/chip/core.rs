//! Emulation-core contract
//!
//! The numeric chip model is an external collaborator: anything that can
//! take register writes and hand back stereo frames can sit behind a chip
//! adapter. Production callers wrap a real emulator; tests inject scripted
//! doubles that record register traffic.

use super::ChipKind;

/// One stereo frame produced by an emulation core, in the core's native
/// 16-bit sample width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    /// Left sample.
    pub left: i16,
    /// Right sample.
    pub right: i16,
}

/// Error raised by an emulation core while producing frames.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct CoreError(
    /// Human-readable reason reported by the core.
    pub String,
);

/// Register-level contract of an FM emulation core.
///
/// Addresses and data are raw bytes; the chip adapters own the register
/// layout and only ever hand the core already-packed values.
pub trait FmCore: Send {
    /// Return the core to its power-on state.
    fn reset(&mut self);

    /// Write one byte to the primary register bank.
    fn write(&mut self, address: u8, data: u8);

    /// Write one byte to the secondary register bank.
    fn write_hi(&mut self, address: u8, data: u8);

    /// Produce the next stereo frame at the core's native rate.
    fn generate(&mut self) -> Result<Frame, CoreError>;

    /// Native output rate in Hz for the given master clock.
    fn sample_rate(&self, clock_hz: u32) -> u32;
}

/// Produces emulation cores for the supported chip variants.
///
/// Returning `None` for a variant makes construction of that chip fail
/// with [`SynthError::CoreUnavailable`](crate::SynthError::CoreUnavailable).
pub trait CoreFactory: Send + Sync {
    /// Build a core for `kind`.
    fn build(&self, kind: ChipKind) -> Option<Box<dyn FmCore>>;
}

impl<F> CoreFactory for F
where
    F: Fn(ChipKind) -> Option<Box<dyn FmCore>> + Send + Sync,
{
    fn build(&self, kind: ChipKind) -> Option<Box<dyn FmCore>> {
        self(kind)
    }
}
