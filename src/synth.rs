//! Synthesizer context and public operation surface
//!
//! [`Synth`] owns everything the operation surface touches: the voice
//! allocator, the pending command queue, the active chip, the resampler
//! pair, and the sample buffers. Two mutual-exclusion domains let an event
//! producer and an audio renderer run concurrently:
//!
//! - the **input domain** guards the allocator and the command queue;
//! - the **output domain** guards the resamplers and all sample buffers.
//!
//! The chip is read by both sides (command application vs. generation), so
//! it sits behind its own lock. Lock order is always
//! input -> output -> chip; the chip lock is never held while acquiring a
//! domain lock. Generation takes (input, chip) to drain commands, releases
//! both, then takes (output, chip) to render - only chip and rate changes
//! hold both domains at once.
//!
//! Critical sections are bounded and allocation-free once the buffers have
//! grown to a load's working size; buffer growth is monotonic and the only
//! non-constant-latency step.

use parking_lot::Mutex;

use crate::chip::{Chip, ChipAdapter, ChipKind, CoreFactory};
use crate::command::{Command, CommandQueue};
use crate::instrument::FmInstrument;
use crate::pitch::Pitch;
use crate::resample::LinearResampler;
use crate::voice::VoiceAllocator;
use crate::{Result, SynthError};

/// Output rate in effect before the caller picks one.
const DEFAULT_RATE_HZ: u32 = 44_100;

/// Initial capacity of the native-rate and output-rate buffers.
const INITIAL_BUFFER_FRAMES: usize = 0x10000;

/// Producer-side state: who owns which channel, and what is pending.
struct InputState {
    allocator: VoiceAllocator,
    commands: CommandQueue,
}

/// Renderer-side state: rate conversion and sample storage.
struct OutputState {
    rate_hz: u32,
    /// Left/right resamplers; `None` before the first chip comes up and
    /// after teardown.
    resamplers: Option<[LinearResampler; 2]>,
    /// Native-rate scratch, left and right. Grows monotonically.
    native: [Vec<f32>; 2],
    /// Output-rate buffers, left and right. Grows monotonically.
    resampled: [Vec<f32>; 2],
}

/// The synthesizer: a self-contained context with no ambient state, so
/// independent instances can coexist (one per test, one per host session).
pub struct Synth {
    factory: Box<dyn CoreFactory>,
    input: Mutex<InputState>,
    output: Mutex<OutputState>,
    chip: Mutex<Option<Chip>>,
}

impl Synth {
    /// Create a context with no chip selected yet.
    ///
    /// `factory` supplies an emulation core whenever a chip variant is
    /// (re)constructed.
    pub fn new<F>(factory: F) -> Self
    where
        F: CoreFactory + 'static,
    {
        Synth {
            factory: Box::new(factory),
            input: Mutex::new(InputState {
                allocator: VoiceAllocator::new(0),
                commands: CommandQueue::new(),
            }),
            output: Mutex::new(OutputState {
                rate_hz: DEFAULT_RATE_HZ,
                resamplers: None,
                native: [
                    vec![0.0; INITIAL_BUFFER_FRAMES],
                    vec![0.0; INITIAL_BUFFER_FRAMES],
                ],
                resampled: [
                    vec![0.0; INITIAL_BUFFER_FRAMES],
                    vec![0.0; INITIAL_BUFFER_FRAMES],
                ],
            }),
            chip: Mutex::new(None),
        }
    }

    /// Bring the system up on the default chip variant.
    pub fn initialize(&self) -> Result<()> {
        self.change_chip(ChipKind::Ym2608)
    }

    /// Release the resampler resources. Further generation fails until a
    /// chip or rate change configures a new pair.
    pub fn deinitialize(&self) -> Result<()> {
        let mut output = self.output.lock();
        output.resamplers = None;
        log::debug!("audio pipeline torn down");
        Ok(())
    }

    /// Silence the active chip. Idempotent.
    pub fn reset(&self) -> Result<()> {
        let mut chip = self.chip.lock();
        chip.as_mut().ok_or(SynthError::ChipNotReady)?.reset()
    }

    /// Swap the active chip variant.
    ///
    /// The voice allocator is rebuilt at the new chip's channel count and
    /// the resampler pair is reconfigured against its native rate. A
    /// factory failure leaves everything untouched; a resampler failure
    /// commits the new chip but clears the resampler slot (the old pair
    /// would silently run at the wrong native rate).
    pub fn change_chip(&self, kind: ChipKind) -> Result<()> {
        // Construct before touching shared state, so failure has no side
        // effect.
        let new_chip = Chip::build(kind, self.factory.as_ref())?;
        let num_channels = new_chip.num_channels();
        let native_rate = new_chip.sample_rate();

        let mut input = self.input.lock();
        let mut output = self.output.lock();
        let mut chip = self.chip.lock();

        input.allocator = VoiceAllocator::new(num_channels);
        *chip = Some(new_chip);

        output.resamplers = None;
        let pair = resampler_pair(native_rate, output.rate_hz)?;
        output.resamplers = Some(pair);

        log::debug!(
            "chip changed to {:?}: {} channels, native rate {} Hz",
            kind,
            num_channels,
            native_rate
        );
        Ok(())
    }

    /// Reconfigure the output rate.
    ///
    /// Commit-on-success: a rejected rate leaves the previous rate and the
    /// previously-working resampler pair live.
    pub fn set_sampling_rate(&self, rate_hz: u32) -> Result<()> {
        let _input = self.input.lock();
        let mut output = self.output.lock();
        let chip = self.chip.lock();

        let native_rate = chip.as_ref().ok_or(SynthError::ChipNotReady)?.sample_rate();
        let pair = resampler_pair(native_rate, rate_hz)?;

        output.resamplers = Some(pair);
        output.rate_hz = rate_hz;

        log::debug!("output rate set to {} Hz", rate_hz);
        Ok(())
    }

    /// Start a note.
    ///
    /// Allocates a channel for `note_id` (stealing the oldest voice when
    /// full) and enqueues the resulting commands: a release for the stolen
    /// channel first, then the key-on.
    pub fn key_on(&self, note_id: u32, octave: i32, semitone: i32) {
        let mut input = self.input.lock();

        let Some(assignment) = input.allocator.key_on(note_id) else {
            // No channels at all (chip not up yet).
            return;
        };

        if let Some(stolen) = assignment.stolen {
            input.commands.push(Command::NoteOff { channel: stolen });
        }
        input.commands.push(Command::NoteOn {
            channel: assignment.channel,
            pitch: Pitch::new(octave, semitone),
        });
    }

    /// Release a note. A no-op if `note_id` is not sounding.
    pub fn key_off(&self, note_id: u32) {
        let mut input = self.input.lock();

        if let Some(channel) = input.allocator.key_off(note_id) {
            input.commands.push(Command::NoteOff { channel });
        }
    }

    /// Queue an instrument change, applied to every channel at the next
    /// generation call.
    pub fn set_instrument(&self, instrument: &FmInstrument) {
        let mut input = self.input.lock();
        input
            .commands
            .push(Command::SetInstrument(instrument.clone()));
    }

    /// Produce `left.len()` output-rate stereo frames, samples in roughly
    /// `[-1, 1]`.
    ///
    /// Pending commands are applied first, in arrival order; a failed
    /// apply aborts the call with the queue position preserved. The chip
    /// then renders at its native rate into scratch storage and the
    /// resampler pair converts each channel independently.
    pub fn generate(&self, left: &mut [f32], right: &mut [f32]) -> Result<()> {
        if left.len() != right.len() {
            return Err(SynthError::BufferMismatch {
                left: left.len(),
                right: right.len(),
            });
        }
        let num_samples = left.len();

        {
            let mut input = self.input.lock();
            let mut chip = self.chip.lock();
            let chip = chip.as_mut().ok_or(SynthError::ChipNotReady)?;
            input.commands.drain_into(chip)?;
        }

        let mut output_guard = self.output.lock();
        let output = &mut *output_guard;
        let mut chip_guard = self.chip.lock();
        let chip = chip_guard.as_mut().ok_or(SynthError::ChipNotReady)?;

        let OutputState {
            resamplers,
            native,
            resampled,
            ..
        } = output;
        let [left_rs, right_rs] = resamplers.as_mut().ok_or(SynthError::NotConfigured)?;

        let needed = left_rs.required_input_frames(num_samples as u64) as usize;

        let [native_l, native_r] = native;
        if needed > native_l.len() {
            native_l.resize(needed, 0.0);
            native_r.resize(needed, 0.0);
        }
        chip.generate(&mut native_l[..needed], &mut native_r[..needed])?;

        let [out_l, out_r] = resampled;
        if num_samples > out_l.len() {
            out_l.resize(num_samples, 0.0);
            out_r.resize(num_samples, 0.0);
        }

        left_rs.process(&native_l[..needed], &mut out_l[..num_samples]);
        right_rs.process(&native_r[..needed], &mut out_r[..num_samples]);

        left.copy_from_slice(&out_l[..num_samples]);
        right.copy_from_slice(&out_r[..num_samples]);

        Ok(())
    }

    /// Variant of the active chip, if one is up.
    pub fn chip_kind(&self) -> Option<ChipKind> {
        self.chip.lock().as_ref().map(Chip::kind)
    }

    /// Number of pending (not yet applied) commands.
    pub fn pending_commands(&self) -> usize {
        self.input.lock().commands.len()
    }
}

/// Build the left/right resampler pair for one native/output rate pairing.
fn resampler_pair(in_rate: u32, out_rate: u32) -> Result<[LinearResampler; 2]> {
    Ok([
        LinearResampler::new(in_rate, out_rate)?,
        LinearResampler::new(in_rate, out_rate)?,
    ])
}
