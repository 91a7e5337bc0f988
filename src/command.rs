//! Pending note/instrument event queue
//!
//! Events arrive from the caller thread and are applied to the chip from
//! the rendering path just before sample generation. Order of arrival is
//! order of application; a failed apply stops the drain and leaves the
//! failed command at the head so the next generation call retries it.

use std::collections::VecDeque;

use crate::chip::{Chip, ChipAdapter};
use crate::instrument::FmInstrument;
use crate::pitch::Pitch;
use crate::Result;

/// One pending event, immutable once enqueued.
#[derive(Debug, Clone)]
pub(crate) enum Command {
    /// Start a note on a chip channel.
    NoteOn {
        /// Target channel.
        channel: u8,
        /// Pitch to sound.
        pitch: Pitch,
    },
    /// Stop the note on a chip channel.
    NoteOff {
        /// Target channel.
        channel: u8,
    },
    /// Load an instrument onto every channel.
    SetInstrument(FmInstrument),
}

/// FIFO of commands awaiting application to the chip.
#[derive(Debug, Default)]
pub(crate) struct CommandQueue {
    pending: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        CommandQueue {
            pending: VecDeque::new(),
        }
    }

    /// Append to the tail. Never blocks, drops, or reorders.
    pub fn push(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Apply pending commands head-first. A command is removed only after
    /// it applied successfully; on failure the drain stops with the failed
    /// command (and everything behind it) still queued. Commands already
    /// applied are not rolled back.
    pub fn drain_into(&mut self, chip: &mut Chip) -> Result<()> {
        while let Some(command) = self.pending.front() {
            match command {
                Command::NoteOn { channel, pitch } => chip.key_on(*channel, *pitch)?,
                Command::NoteOff { channel } => chip.key_off(*channel)?,
                Command::SetInstrument(instrument) => chip.set_instrument(instrument)?,
            }
            self.pending.pop_front();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::{CoreError, FmCore, Frame, Ym2612};

    use std::sync::Arc;

    use parking_lot::Mutex;

    /// Core double that records every register write; second-bank writes
    /// are logged with 0x100 added to the address.
    struct RecordingCore {
        writes: Arc<Mutex<Vec<(u16, u8)>>>,
    }

    impl FmCore for RecordingCore {
        fn reset(&mut self) {}
        fn write(&mut self, address: u8, data: u8) {
            self.writes.lock().push((u16::from(address), data));
        }
        fn write_hi(&mut self, address: u8, data: u8) {
            self.writes.lock().push((0x100 | u16::from(address), data));
        }
        fn generate(&mut self) -> std::result::Result<Frame, CoreError> {
            Ok(Frame::default())
        }
        fn sample_rate(&self, _clock_hz: u32) -> u32 {
            53_267
        }
    }

    fn recording_chip() -> (Chip, Arc<Mutex<Vec<(u16, u8)>>>) {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let core = RecordingCore {
            writes: Arc::clone(&writes),
        };
        let chip = Chip::Ym2612(Ym2612::new(Box::new(core)));
        writes.lock().clear(); // discard construction-time reset writes
        (chip, writes)
    }

    #[test]
    fn test_fifo_application_order() {
        let (mut chip, writes) = recording_chip();
        let mut queue = CommandQueue::new();

        queue.push(Command::NoteOn {
            channel: 0,
            pitch: Pitch::new(4, 0),
        });
        queue.push(Command::NoteOff { channel: 0 });
        queue.push(Command::NoteOn {
            channel: 1,
            pitch: Pitch::new(4, 9),
        });

        queue.drain_into(&mut chip).unwrap();
        assert_eq!(queue.len(), 0, "a drained queue is empty");

        // Key-on for channel 0 (register 0x28 value 0xF0) must precede its
        // key-off (0x00), which must precede channel 1's key-on (0xF1).
        let key_writes: Vec<u8> = writes
            .lock()
            .iter()
            .filter(|(address, _)| *address == 0x28)
            .map(|(_, data)| *data)
            .collect();
        assert_eq!(key_writes, vec![0xF0, 0x00, 0xF1]);
    }

    #[test]
    fn test_drain_consumes_each_command_exactly_once() {
        let (mut chip, writes) = recording_chip();
        let mut queue = CommandQueue::new();

        queue.push(Command::NoteOff { channel: 2 });
        queue.drain_into(&mut chip).unwrap();
        queue.drain_into(&mut chip).unwrap();

        let key_writes = writes
            .lock()
            .iter()
            .filter(|(address, _)| *address == 0x28)
            .count();
        assert_eq!(key_writes, 1, "second drain must find an empty queue");
    }
}
