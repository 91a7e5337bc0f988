//! Real-time control layer for OPN-family FM synthesizers
//!
//! Turns discrete note and instrument events into register-level commands
//! for a Yamaha OPN-family sound chip and a continuous stereo float sample
//! stream at a caller-chosen output rate. The chip's numeric model itself is
//! an external collaborator supplied through the [`FmCore`] trait; this
//! crate owns everything around it.
//!
//! # Features
//! - Voice allocation over the chip's channels with oldest-first stealing
//! - Thread-safe command pipeline decoupling event time from render time
//! - Register protocol for the YM2608 (OPNA) and YM2612 (OPN2) variants,
//!   switchable at runtime
//! - Exact-frame-count linear resampling from the chip's native rate to any
//!   output rate
//! - Instrument parameter types that round-trip editor JSON documents
//!
//! # Quick start
//! ```no_run
//! use opnsynth::{ChipKind, FmCore, Frame, Synth};
//! # struct Silent;
//! # impl FmCore for Silent {
//! #     fn reset(&mut self) {}
//! #     fn write(&mut self, _address: u8, _data: u8) {}
//! #     fn write_hi(&mut self, _address: u8, _data: u8) {}
//! #     fn generate(&mut self) -> Result<Frame, opnsynth::CoreError> {
//! #         Ok(Frame::default())
//! #     }
//! #     fn sample_rate(&self, clock_hz: u32) -> u32 { clock_hz / 144 }
//! # }
//! // The factory hands out an emulation core per chip variant; production
//! // callers back this with a real emulator, tests with scripted doubles.
//! let synth = Synth::new(|_kind: ChipKind| -> Option<Box<dyn FmCore>> {
//!     Some(Box::new(Silent))
//! });
//!
//! synth.initialize().unwrap();
//! synth.set_sampling_rate(48_000).unwrap();
//! synth.key_on(1, 4, 9); // A4 on note id 1
//!
//! let mut left = vec![0.0f32; 512];
//! let mut right = vec![0.0f32; 512];
//! synth.generate(&mut left, &mut right).unwrap();
//! ```

#![warn(missing_docs)]

pub mod chip; // Chip adapters and the emulation-core contract
mod command; // Pending note/instrument event queue
pub mod instrument; // FM instrument parameter types
pub mod pitch; // Musical pitch value type
pub mod resample; // Output-rate conversion
pub mod synth; // Context object and public operation surface
pub mod voice; // Voice allocation

/// Error types for synthesizer operations
#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    /// A chip operation was attempted while no chip instance exists.
    #[error("no chip instance; call initialize() first")]
    ChipNotReady,

    /// A caller-supplied chip variant id is not in the supported set.
    #[error("unsupported chip variant id: {0}")]
    UnsupportedChip(u8),

    /// The core factory has no emulation core for the requested variant.
    #[error("no emulation core available for chip {0:?}")]
    CoreUnavailable(chip::ChipKind),

    /// The resampler rejected an output-rate configuration.
    #[error("resampler rejected rate conversion {in_rate} Hz -> {out_rate} Hz")]
    ResamplerConfig {
        /// Native (chip-side) rate of the rejected pair.
        in_rate: u32,
        /// Output (caller-side) rate of the rejected pair.
        out_rate: u32,
    },

    /// The emulation core failed while producing frames.
    #[error("sample generation failed: {0}")]
    Generation(#[from] chip::CoreError),

    /// The audio pipeline has no resampler (before the first successful
    /// rate configuration, or after deinitialize).
    #[error("audio pipeline is not configured")]
    NotConfigured,

    /// The output buffers handed to generate() differ in length.
    #[error("output buffer length mismatch: left {left}, right {right}")]
    BufferMismatch {
        /// Length of the left buffer.
        left: usize,
        /// Length of the right buffer.
        right: usize,
    },
}

/// Result type for synthesizer operations
pub type Result<T> = std::result::Result<T, SynthError>;

// Public API exports
pub use chip::{
    Chip, ChipAdapter, ChipKind, CoreError, CoreFactory, FmCore, Frame, Ym2608, Ym2612,
};
pub use instrument::{FmInstrument, FmOperator};
pub use pitch::Pitch;
pub use resample::LinearResampler;
pub use synth::Synth;
pub use voice::{KeyOnAssignment, VoiceAllocator};
