//! Output-rate conversion
//!
//! Converts the chip's fixed native rate to an arbitrary caller-chosen
//! output rate with linear interpolation and exact frame accounting: the
//! caller asks how many input frames a given output count needs, supplies
//! exactly that many, and every output frame is filled. The read position
//! is an integer phase accumulator scaled by the output rate, so repeated
//! calls never drift.

use crate::{Result, SynthError};

/// Streaming linear-interpolation resampler for one channel.
#[derive(Debug, Clone)]
pub struct LinearResampler {
    in_rate: u32,
    out_rate: u32,
    /// Fractional read position between `x0` and `x1`, scaled by
    /// `out_rate`; always `< out_rate`.
    phase: u64,
    /// Input frame just behind the read position.
    x0: f32,
    /// Input frame just ahead of the read position.
    x1: f32,
}

impl LinearResampler {
    /// Configure a conversion from `in_rate` to `out_rate` Hz.
    ///
    /// Rejects a zero rate on either side.
    pub fn new(in_rate: u32, out_rate: u32) -> Result<Self> {
        if in_rate == 0 || out_rate == 0 {
            return Err(SynthError::ResamplerConfig { in_rate, out_rate });
        }

        Ok(LinearResampler {
            in_rate,
            out_rate,
            phase: 0,
            x0: 0.0,
            x1: 0.0,
        })
    }

    /// Input rate this instance converts from.
    pub fn in_rate(&self) -> u32 {
        self.in_rate
    }

    /// Output rate this instance converts to.
    pub fn out_rate(&self) -> u32 {
        self.out_rate
    }

    /// Exact number of input frames the next [`process`](Self::process)
    /// call will consume to emit `out_frames`.
    pub fn required_input_frames(&self, out_frames: u64) -> u64 {
        (self.phase + out_frames * u64::from(self.in_rate)) / u64::from(self.out_rate)
    }

    /// Convert `input` into `output`, filling every output frame.
    ///
    /// `input` must hold at least the frames most recently reported by
    /// `required_input_frames(output.len())`; exactly that many are
    /// consumed. An under-supplied input holds the last frame instead of
    /// reading out of bounds.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        let out_rate = u64::from(self.out_rate);
        let in_rate = u64::from(self.in_rate);
        let mut next = input.iter().copied();

        for out in output.iter_mut() {
            let t = self.phase as f32 / self.out_rate as f32;
            *out = self.x0 + (self.x1 - self.x0) * t;

            self.phase += in_rate;
            while self.phase >= out_rate {
                self.phase -= out_rate;
                self.x0 = self.x1;
                self.x1 = next.next().unwrap_or(self.x1);
            }
        }
    }
}
