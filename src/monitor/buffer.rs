//! Bounded packet history buffer.
//!
//! Holds the most recent N packets in newest-first insertion order with a
//! hard memory ceiling. Insertion is O(1) amortized; eviction clamps the
//! length back to capacity on every push, dropping the oldest entries.
//!
//! There is no update or delete of individual entries - only
//! append-and-clamp. The `0 <= len <= capacity` invariant holds before
//! and after every operation.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

use crate::protocol::Packet;

// ============================================================================
// Constants
// ============================================================================

/// Default packet history capacity.
pub const MAX_PACKETS: usize = 500;

// ============================================================================
// PacketBuffer
// ============================================================================

/// Bounded, newest-first packet history.
///
/// Buffer order is insertion order, which is not guaranteed to be
/// monotonic in packet timestamp if frames arrive out of temporal
/// order; the buffer never reorders.
#[derive(Debug, Clone)]
pub struct PacketBuffer {
    /// Newest packet at the front.
    entries: VecDeque<Packet>,
    /// Hard length ceiling.
    capacity: usize,
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new(MAX_PACKETS)
    }
}

impl PacketBuffer {
    /// Creates an empty buffer with the given capacity.
    ///
    /// A zero capacity is pinned to 1: a buffer that can hold nothing
    /// has no meaningful contract.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Inserts a packet at the front, then clamps to capacity.
    ///
    /// Returns the number of entries evicted (0 or 1 in steady state).
    pub fn push(&mut self, packet: Packet) -> usize {
        self.entries.push_front(packet);

        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
            evicted += 1;
        }
        evicted
    }

    /// Returns the number of retained packets.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no packets are retained.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the configured capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates retained packets, newest first.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Packet> {
        self.entries.iter()
    }

    /// Returns the full retained sequence, newest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Packet> {
        self.entries.iter().cloned().collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
