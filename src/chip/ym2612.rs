//! YM2612 (OPN2) adapter

use crate::chip::core::FmCore;
use crate::chip::opn::{self, OpnEngine};
use crate::chip::ChipAdapter;
use crate::instrument::FmInstrument;
use crate::pitch::Pitch;
use crate::Result;

/// Master clock as fitted to the Mega Drive.
const CLOCK_HZ: u32 = 7_670_453;

/// F-numbers for one octave of semitones (C..B) at this clock.
const FNUM_TABLE: [u16; 12] = [
    0x0284, 0x02AA, 0x02D3, 0x02FE, 0x032B, 0x035B, 0x038E, 0x03C5, 0x03FE, 0x043B, 0x047B,
    0x04BF,
];

/// Channel-3 mode register; zero keeps the channel in normal mode.
const CH3_MODE: u8 = 0x27;

/// Control layer for the YM2612.
pub struct Ym2612 {
    engine: OpnEngine,
}

impl Ym2612 {
    /// Wrap an emulation core and bring the chip to a silent, centered
    /// state.
    pub fn new(core: Box<dyn FmCore>) -> Self {
        let mut chip = Ym2612 {
            engine: OpnEngine::new(core, CLOCK_HZ, &FNUM_TABLE),
        };
        chip.apply_reset();
        chip
    }

    fn apply_reset(&mut self) {
        self.engine.reset_core();
        self.engine.write(CH3_MODE, 0);
        self.engine.center_all_pans();
    }
}

impl ChipAdapter for Ym2612 {
    fn reset(&mut self) -> Result<()> {
        self.apply_reset();
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.engine.sample_rate()
    }

    fn num_channels(&self) -> u8 {
        opn::NUM_CHANNELS
    }

    fn key_on(&mut self, channel: u8, pitch: Pitch) -> Result<()> {
        self.engine.key_on(channel, pitch)
    }

    fn key_off(&mut self, channel: u8) -> Result<()> {
        self.engine.key_off(channel)
    }

    fn set_instrument(&mut self, instrument: &FmInstrument) -> Result<()> {
        self.engine.set_instrument(instrument)
    }

    fn generate(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<()> {
        self.engine.generate(left, right)
    }
}
