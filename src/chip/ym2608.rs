//! YM2608 (OPNA) adapter
//!
//! The OPNA adds rhythm and ADPCM sections on top of the OPN FM core; only
//! the six FM note channels are driven here. After power-on the FM section
//! runs three channels; the mode register's high bit switches it to six.

use crate::chip::core::FmCore;
use crate::chip::opn::{self, OpnEngine};
use crate::chip::ChipAdapter;
use crate::instrument::FmInstrument;
use crate::pitch::Pitch;
use crate::Result;

/// Master clock as fitted to the PC-8801/PC-9801 line.
const CLOCK_HZ: u32 = 7_987_200;

/// F-numbers for one octave of semitones (C..B) at this clock.
const FNUM_TABLE: [u16; 12] = [
    0x026A, 0x028F, 0x02B6, 0x02DF, 0x030B, 0x0339, 0x036A, 0x039E, 0x03D5, 0x0410, 0x044E,
    0x048F,
];

/// Mode register; bit 7 selects six-channel FM operation.
const MODE: u8 = 0x29;
const SIX_CHANNEL_MODE: u8 = 0x80;

/// Control layer for the YM2608.
pub struct Ym2608 {
    engine: OpnEngine,
}

impl Ym2608 {
    /// Wrap an emulation core and bring the chip to a silent, centered
    /// six-channel state.
    pub fn new(core: Box<dyn FmCore>) -> Self {
        let mut chip = Ym2608 {
            engine: OpnEngine::new(core, CLOCK_HZ, &FNUM_TABLE),
        };
        chip.apply_reset();
        chip
    }

    fn apply_reset(&mut self) {
        self.engine.reset_core();
        self.engine.write(MODE, SIX_CHANNEL_MODE);
        self.engine.center_all_pans();
    }
}

impl ChipAdapter for Ym2608 {
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
