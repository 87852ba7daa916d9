use bytes::Bytes;
use pktlink_frame::{is_reserved, MAX_PAYLOAD};
use pktlink_radio::Address;

use crate::error::{MuxError, Result};
use crate::slots::SlotArena;

/// A message waiting to be packed into a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    /// Destination program.
    pub program: u8,
    /// Destination radio.
    pub destination: Address,
    /// Message bytes.
    pub payload: Bytes,
}

impl PendingMessage {
    /// Whether the payload is small enough to be packed.
    pub fn is_packable(&self) -> bool {
        self.payload.len() <= MAX_PAYLOAD
    }
}

/// Bounded store of outbound messages.
///
/// Messages take the lowest free slot and are drained in slot order, so
/// messages for one destination keep their relative order.
#[derive(Debug)]
pub struct OutboundQueue {
    slots: SlotArena<PendingMessage>,
}

impl OutboundQueue {
    /// Allocate a queue with `depth` slots.
    pub fn new(depth: usize) -> Self {
        Self {
            slots: SlotArena::new(depth),
        }
    }

    /// Queue a message and return the slot it took.
    ///
    /// The payload length is not checked here: anything longer than
    /// [`MAX_PAYLOAD`] is accepted and then dropped by the next flush.
    pub fn enqueue(&mut self, program: u8, destination: &Address, payload: &[u8]) -> Result<usize> {
        if is_reserved(program) {
            return Err(MuxError::ReservedProgram(program));
        }

        let message = PendingMessage {
            program,
            destination: *destination,
            payload: Bytes::copy_from_slice(payload),
        };
        self.slots.insert(message).map_err(|_| MuxError::QueueFull {
            depth: self.slots.capacity(),
        })
    }

    /// Total slots.
    pub fn depth(&self) -> usize {
        self.slots.capacity()
    }

    /// Messages waiting.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `enqueue` would fail for lack of space.
    pub fn is_full(&self) -> bool {
        self.slots.is_full()
    }

    /// Lowest occupied slot.
    pub fn first_occupied(&self) -> Option<usize> {
        self.slots.first_occupied()
    }

    /// Message in slot `index`.
    pub fn get(&self, index: usize) -> Option<&PendingMessage> {
        self.slots.get(index)
    }

    /// Remove and return the message in slot `index`.
    pub fn take(&mut self, index: usize) -> Option<PendingMessage> {
        self.slots.take(index)
    }

    /// Waiting messages in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingMessage> {
        self.slots.iter().map(|(_, message)| message)
    }
}
