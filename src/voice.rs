//! Voice allocation
//!
//! Maps caller note identifiers onto a bounded set of chip channels.
//! Channels are handed out from a FIFO free pool; when the pool is empty the
//! voice triggered longest ago is evicted, strictly by recency and never by
//! channel index. Re-triggering an id that is still sounding is handled as
//! an ordinary new allocation.

use std::collections::{HashMap, VecDeque};

/// Result of a key-on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOnAssignment {
    /// Channel the new note sounds on.
    pub channel: u8,
    /// Channel whose previous owner was evicted to make room, if any.
    pub stolen: Option<u8>,
}

/// Assigns note ids to a fixed number of channels, stealing the
/// least-recently-triggered voice when every channel is busy.
#[derive(Debug, Clone)]
pub struct VoiceAllocator {
    /// Unassigned channel indices, reused in FIFO order.
    free_channels: VecDeque<u8>,
    /// Note id -> assigned channel.
    assignments: HashMap<u32, u8>,
    /// Active note ids, most recently triggered first.
    trigger_order: VecDeque<u32>,
}

impl VoiceAllocator {
    /// Create an allocator over channels `0..num_channels`, all free.
    pub fn new(num_channels: u8) -> Self {
        VoiceAllocator {
            free_channels: (0..num_channels).collect(),
            assignments: HashMap::new(),
            trigger_order: VecDeque::new(),
        }
    }

    /// Assign a channel to `id`, evicting the oldest active voice if no
    /// channel is free.
    ///
    /// Returns `None` only for a zero-capacity allocator.
    pub fn key_on(&mut self, id: u32) -> Option<KeyOnAssignment> {
        let mut stolen = None;

        if self.free_channels.is_empty() {
            // Walk the recency record back-to-front; entries whose id no
            // longer maps to a channel are stale duplicates from an earlier
            // re-trigger and are discarded.
            while stolen.is_none() {
                let oldest = self.trigger_order.pop_back()?;
                if let Some(channel) = self.assignments.remove(&oldest) {
                    self.free_channels.push_back(channel);
                    stolen = Some(channel);
                }
            }
        }

        self.trigger_order.push_front(id);

        let channel = self.free_channels.pop_front()?;
        self.assignments.insert(id, channel);

        Some(KeyOnAssignment { channel, stolen })
    }

    /// Release the channel owned by `id`, returning it to the free pool.
    ///
    /// Returns the freed channel, or `None` if `id` owns no channel (never
    /// seen, already released, or already stolen) - a no-op in that case.
    pub fn key_off(&mut self, id: u32) -> Option<u8> {
        let channel = self.assignments.remove(&id)?;
        self.free_channels.push_back(channel);
        self.trigger_order.retain(|&active| active != id);
        Some(channel)
    }

    /// Number of currently assigned voices.
    pub fn active_voices(&self) -> usize {
        self.assignments.len()
    }

    /// True if `id` currently owns a channel.
    pub fn is_active(&self, id: u32) -> bool {
        self.assignments.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_channels_up_to_capacity() {
        let mut allocator = VoiceAllocator::new(6);

        let mut channels = Vec::new();
        for id in 0..6 {
            let assignment = allocator.key_on(id).unwrap();
            assert_eq!(assignment.stolen, None, "no eviction below capacity");
            channels.push(assignment.channel);
        }

        channels.sort_unstable();
        channels.dedup();
        assert_eq!(channels.len(), 6, "all six channels must be distinct");
        assert_eq!(allocator.active_voices(), 6);
    }

    #[test]
    fn test_eviction_steals_oldest() {
        let mut allocator = VoiceAllocator::new(3);

        let first = allocator.key_on(10).unwrap().channel;
        allocator.key_on(11).unwrap();
        allocator.key_on(12).unwrap();

        // Full: the next key-on must evict note 10, the oldest.
        let assignment = allocator.key_on(13).unwrap();
        assert_eq!(assignment.stolen, Some(first));
        assert_eq!(assignment.channel, first, "freed channel is reused");
        assert!(!allocator.is_active(10));
        assert!(allocator.is_active(13));
    }

    #[test]
    fn test_eviction_order_is_recency_not_channel_index() {
        let mut allocator = VoiceAllocator::new(3);

        allocator.key_on(1).unwrap();
        allocator.key_on(2).unwrap();
        allocator.key_on(3).unwrap();

        // Releasing and re-triggering note 1 makes it the newest voice.
        allocator.key_off(1);
        allocator.key_on(1).unwrap();

        // Oldest is now note 2.
        let assignment = allocator.key_on(4).unwrap();
        assert!(!allocator.is_active(2));
        assert!(allocator.is_active(1));
        assert_eq!(assignment.stolen, Some(1), "note 2 held channel 1");
    }

    #[test]
    fn test_key_off_frees_and_protects_from_eviction() {
        let mut allocator = VoiceAllocator::new(2);

        allocator.key_on(1).unwrap();
        allocator.key_on(2).unwrap();

        assert_eq!(allocator.key_off(1), Some(0));
        assert_eq!(allocator.active_voices(), 1);

        // The freed channel is reused without stealing.
        let assignment = allocator.key_on(3).unwrap();
        assert_eq!(assignment.channel, 0);
        assert_eq!(assignment.stolen, None);

        // Note 2 (older than 3) is the eviction candidate now.
        let assignment = allocator.key_on(4).unwrap();
        assert!(!allocator.is_active(2));
        assert!(allocator.is_active(3));
        assert_eq!(assignment.stolen, Some(1));
    }

    #[test]
    fn test_key_off_unknown_id_is_noop() {
        let mut allocator = VoiceAllocator::new(2);
        allocator.key_on(1).unwrap();

        assert_eq!(allocator.key_off(99), None);
        assert_eq!(allocator.key_off(1), Some(0));
        assert_eq!(allocator.key_off(1), None, "double release is a no-op");
        assert_eq!(allocator.active_voices(), 0);
    }

    #[test]
    fn test_retrigger_is_ordinary_allocation() {
        let mut allocator = VoiceAllocator::new(3);

        allocator.key_on(1).unwrap();
        allocator.key_on(2).unwrap();

        // Re-trigger note 1 while it still sounds: a fresh channel is
        // assigned and the mapping moves to it.
        let retrigger = allocator.key_on(1).unwrap();
        assert_eq!(retrigger.stolen, None);
        assert_eq!(retrigger.channel, 2);

        // Key-off releases only the current channel and clears every
        // recency entry for the id.
        assert_eq!(allocator.key_off(1), Some(2));
        assert!(!allocator.is_active(1));
        assert_eq!(allocator.active_voices(), 1);
    }

    #[test]
    fn test_zero_capacity_never_assigns() {
        let mut allocator = VoiceAllocator::new(0);
        assert_eq!(allocator.key_on(1), None);
        assert_eq!(allocator.key_off(1), None);
    }

    #[test]
    fn test_reconstruction_discards_state() {
        let mut allocator = VoiceAllocator::new(4);
        for id in 0..4 {
            allocator.key_on(id).unwrap();
        }

        // A new channel count means a fresh allocator.
        allocator = VoiceAllocator::new(2);
        assert_eq!(allocator.active_voices(), 0);

        let a = allocator.key_on(100).unwrap();
        let b = allocator.key_on(101).unwrap();
        assert_eq!((a.stolen, b.stolen), (None, None));

        let c = allocator.key_on(102).unwrap();
        assert_eq!(c.stolen, Some(a.channel), "third key-on evicts on a 2-channel pool");
    }
}
