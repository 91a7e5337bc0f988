//! OPN-family register protocol
//!
//! The YM2608 and YM2612 expose six FM channels as two banks of three and
//! share one register map for frequency, key state, and operator
//! parameters. Everything layout-shaped lives here; a variant adapter only
//! supplies its master clock, its F-number table, and its reset-time mode
//! writes.
//!
//! Bit-packing is total: every multi-bit field is masked to its declared
//! width before insertion, so no parameter value can ever reject a write.

use bitflags::bitflags;

use crate::chip::core::FmCore;
use crate::instrument::{FmInstrument, FmOperator};
use crate::pitch::Pitch;
use crate::Result;

/// Register addresses. Per-channel registers add the channel offset
/// (0..=2 within a bank); per-operator registers additionally add the
/// operator's address stride.
pub(crate) mod reg {
    /// LFO enable and frequency.
    pub const LFO: u8 = 0x22;
    /// Key on/off: operator slot gates plus channel select.
    pub const KEY: u8 = 0x28;
    /// Detune / frequency multiplier.
    pub const DT_ML: u8 = 0x30;
    /// Total level.
    pub const TL: u8 = 0x40;
    /// Key scale / attack rate.
    pub const KS_AR: u8 = 0x50;
    /// Amplitude-modulation flag / decay rate.
    pub const AM_DR: u8 = 0x60;
    /// Sustain rate.
    pub const SR: u8 = 0x70;
    /// Sustain level / release rate.
    pub const SL_RR: u8 = 0x80;
    /// SSG-EG envelope mode.
    pub const SSG_EG: u8 = 0x90;
    /// F-number low byte.
    pub const FNUM_LO: u8 = 0xA0;
    /// Block and F-number high bits; must be written before `FNUM_LO`
    /// latches the full value.
    pub const BLOCK_FNUM_HI: u8 = 0xA4;
    /// Feedback / algorithm.
    pub const FB_AL: u8 = 0xB0;
    /// Stereo panning and AM/PM sensitivity.
    pub const PAN_AMS_PMS: u8 = 0xB4;
}

bitflags! {
    /// Fields of the key state register (0x28).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct KeyFlags: u8 {
        /// Operator slot 1 gate.
        const SLOT1 = 0x10;
        /// Operator slot 2 gate.
        const SLOT2 = 0x20;
        /// Operator slot 3 gate.
        const SLOT3 = 0x40;
        /// Operator slot 4 gate.
        const SLOT4 = 0x80;
        /// All four operator slots.
        const ALL_SLOTS = 0xF0;
        /// Channel lives in the second register bank.
        const BANK_HI = 0x04;
    }
}

/// Panning field of 0xB4 with both speakers enabled.
pub(crate) const CENTER_PAN: u8 = 0xC0;

/// Channels per register bank.
pub(crate) const CHANNELS_PER_BANK: u8 = 3;

/// FM note channels exposed by the family.
pub(crate) const NUM_CHANNELS: u8 = 6;

/// Address stride of each operator within a channel's register block.
const OP_OFFSETS: [u8; 4] = [0x0, 0x8, 0x4, 0xC];

/// Pack `(octave, semitone)` into the 14-bit block/F-number word: the
/// octave shifted into the 3-bit block field over an 11-bit F-number from
/// the per-variant semitone table.
pub(crate) fn block_fnum(table: &[u16; 12], pitch: Pitch) -> u16 {
    let fnum = table[pitch.semitone_index()] & 0x7FF;
    (((pitch.octave as u16) & 0x7) << 11) | fnum
}

/// Bank and in-bank offset for a channel index; `None` for indices past
/// the last channel (such writes are silently dropped).
fn split_channel(channel: u8) -> Option<(bool, u8)> {
    if channel < CHANNELS_PER_BANK {
        Some((false, channel))
    } else if channel < NUM_CHANNELS {
        Some((true, channel - CHANNELS_PER_BANK))
    } else {
        None
    }
}

// Register byte packing. Each field is masked to its register width.

fn fb_al(instrument: &FmInstrument) -> u8 {
    ((instrument.fb & 0x7) << 3) | (instrument.al & 0x7)
}

fn lfo_freq(instrument: &FmInstrument) -> u8 {
    instrument.lfo_freq & 0xF
}

fn ams_pms(instrument: &FmInstrument) -> u8 {
    ((instrument.ams & 0x3) << 4) | (instrument.pms & 0x7)
}

fn dt_ml(op: &FmOperator) -> u8 {
    ((op.dt & 0x7) << 4) | (op.ml & 0xF)
}

fn tl(op: &FmOperator) -> u8 {
    op.tl & 0x7F
}

fn ks_ar(op: &FmOperator) -> u8 {
    ((op.ks & 0x3) << 6) | (op.ar & 0x1F)
}

fn am_dr(op: &FmOperator) -> u8 {
    (if op.am { 0x80 } else { 0 }) | (op.dr & 0x1F)
}

fn sr(op: &FmOperator) -> u8 {
    op.sr & 0x1F
}

fn sl_rr(op: &FmOperator) -> u8 {
    ((op.sl & 0xF) << 4) | (op.rr & 0xF)
}

fn ssg_eg(op: &FmOperator) -> u8 {
    op.ssg_eg & 0xF
}

/// Six-channel OPN engine owning the emulation core.
///
/// Implements the whole shared protocol; the wrapping adapter adds only
/// its variant's reset quirks.
pub(crate) struct OpnEngine {
    core: Box<dyn FmCore>,
    clock_hz: u32,
    fnum_table: &'static [u16; 12],
}

impl OpnEngine {
    pub fn new(core: Box<dyn FmCore>, clock_hz: u32, fnum_table: &'static [u16; 12]) -> Self {
        OpnEngine {
            core,
            clock_hz,
            fnum_table,
        }
    }

    pub fn write(&mut self, address: u8, data: u8) {
        self.core.write(address, data);
    }

    fn write_hi(&mut self, address: u8, data: u8) {
        self.core.write_hi(address, data);
    }

    /// Write the same value to both register banks.
    fn write_both(&mut self, address: u8, data: u8) {
        self.write(address, data);
        self.write_hi(address, data);
    }

    pub fn reset_core(&mut self) {
        self.core.reset();
    }

    /// Force center panning on every channel of both banks.
    pub fn center_all_pans(&mut self) {
        for ch in 0..CHANNELS_PER_BANK {
            self.write_both(reg::PAN_AMS_PMS + ch, CENTER_PAN);
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.core.sample_rate(self.clock_hz)
    }

    pub fn key_on(&mut self, channel: u8, pitch: Pitch) -> Result<()> {
        let Some((bank_hi, offset)) = split_channel(channel) else {
            return Ok(());
        };

        let word = block_fnum(self.fnum_table, pitch);
        let (hi, lo) = ((word >> 8) as u8, (word & 0xFF) as u8);

        if bank_hi {
            self.write_hi(reg::BLOCK_FNUM_HI + offset, hi);
            self.write_hi(reg::FNUM_LO + offset, lo);
            self.write(
                reg::KEY,
                (KeyFlags::ALL_SLOTS | KeyFlags::BANK_HI).bits() | offset,
            );
        } else {
            self.write(reg::BLOCK_FNUM_HI + offset, hi);
            self.write(reg::FNUM_LO + offset, lo);
            self.write(reg::KEY, KeyFlags::ALL_SLOTS.bits() | offset);
        }

        Ok(())
    }

    pub fn key_off(&mut self, channel: u8) -> Result<()> {
        let Some((bank_hi, offset)) = split_channel(channel) else {
            return Ok(());
        };

        // Slot gates cleared; only the channel select remains.
        let select = if bank_hi {
            KeyFlags::BANK_HI.bits() | offset
        } else {
            offset
        };
        self.write(reg::KEY, select);

        Ok(())
    }

    /// Load `instrument` onto every channel of both banks.
    pub fn set_instrument(&mut self, instrument: &FmInstrument) -> Result<()> {
        self.write(reg::LFO, lfo_freq(instrument));

        for ch in 0..CHANNELS_PER_BANK {
            self.write_both(reg::FB_AL + ch, fb_al(instrument));
            self.write_both(reg::PAN_AMS_PMS + ch, CENTER_PAN | ams_pms(instrument));

            for (slot, op) in instrument.op.iter().enumerate() {
                let base = ch + OP_OFFSETS[slot];
                self.write_both(reg::DT_ML + base, dt_ml(op));
                self.write_both(reg::TL + base, tl(op));
                self.write_both(reg::KS_AR + base, ks_ar(op));
                self.write_both(reg::AM_DR + base, am_dr(op));
                self.write_both(reg::SR + base, sr(op));
                self.write_both(reg::SL_RR + base, sl_rr(op));
                self.write_both(reg::SSG_EG + base, ssg_eg(op));
            }
        }

        Ok(())
    }

    /// Fill both buffers with normalized frames, one core generation per
    /// frame.
    pub fn generate(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<()> {
        const NORMALIZE: f32 = i16::MAX as f32;

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let frame = self.core.generate()?;
            *l = f32::from(frame.left) / NORMALIZE;
            *r = f32::from(frame.right) / NORMALIZE;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_masking_is_total() {
        let mut op = FmOperator::default();
        op.dt = 0xFF;
        op.ml = 0xFF;
        assert_eq!(dt_ml(&op), 0x7F, "dt keeps 3 bits, ml keeps 4");

        op.ks = 0xFF;
        op.ar = 0xFF;
        assert_eq!(ks_ar(&op), 0xDF, "ks keeps 2 bits, ar keeps 5");

        op.am = true;
        op.dr = 0xFF;
        assert_eq!(am_dr(&op), 0x9F);

        op.sl = 0xFF;
        op.rr = 0xFF;
        assert_eq!(sl_rr(&op), 0xFF);

        op.tl = 0xFF;
        assert_eq!(tl(&op), 0x7F);

        let mut instrument = FmInstrument::default();
        instrument.fb = 0xFF;
        instrument.al = 0xFF;
        assert_eq!(fb_al(&instrument), 0x3F);

        instrument.ams = 0xFF;
        instrument.pms = 0xFF;
        assert_eq!(ams_pms(&instrument), 0x37);

        instrument.lfo_freq = 0xFF;
        assert_eq!(lfo_freq(&instrument), 0x0F);
    }

    #[test]
    fn test_block_fnum_packing() {
        const TABLE: [u16; 12] = [
            0x0284, 0x02AA, 0x02D3, 0x02FE, 0x032B, 0x035B, 0x038E, 0x03C5, 0x03FE, 0x043B,
            0x047B, 0x04BF,
        ];

        assert_eq!(block_fnum(&TABLE, Pitch::new(0, 0)), 0x0284);
        assert_eq!(block_fnum(&TABLE, Pitch::new(4, 9)), (4 << 11) | 0x043B);
        // Octave is masked to the 3-bit block field.
        assert_eq!(block_fnum(&TABLE, Pitch::new(8, 0)), 0x0284);
        // Semitone folds instead of indexing out of range.
        assert_eq!(block_fnum(&TABLE, Pitch::new(2, 12)), (2 << 11) | 0x0284);
    }

    #[test]
    fn test_channel_bank_split() {
        assert_eq!(split_channel(0), Some((false, 0)));
        assert_eq!(split_channel(2), Some((false, 2)));
        assert_eq!(split_channel(3), Some((true, 0)));
        assert_eq!(split_channel(5), Some((true, 2)));
        assert_eq!(split_channel(6), None);
    }
}
