use std::fmt;

use pktlink_radio::MAX_FRAME_LEN;
use tracing::trace;

use crate::error::{FrameError, Result};
use crate::program::{is_padding, is_reserved};

/// Largest frame the radio carries.
pub const FRAME_CAPACITY: usize = MAX_FRAME_LEN;

/// Largest payload one sub-record may carry when packed.
pub const MAX_PAYLOAD: usize = 16;

/// Sub-record header: program ID (1) + length (1).
pub const RECORD_HEADER_SIZE: usize = 2;

/// A borrowed view of one sub-record inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubRecord<'a> {
    program: u8,
    payload: &'a [u8],
}

impl<'a> SubRecord<'a> {
    /// Create a record view.
    pub fn new(program: u8, payload: &'a [u8]) -> Self {
        Self { program, payload }
    }

    /// The program this record is addressed to.
    pub fn program(&self) -> u8 {
        self.program
    }

    /// The record payload.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Bytes this record occupies in a frame.
    pub fn wire_size(&self) -> usize {
        RECORD_HEADER_SIZE + self.payload.len()
    }
}

/// A frame under assembly or just received, held inline.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    buf: [u8; FRAME_CAPACITY],
    len: usize,
}

impl Frame {
    /// An empty frame.
    pub fn new() -> Self {
        Self {
            buf: [0u8; FRAME_CAPACITY],
            len: 0,
        }
    }

    /// Copy received bytes into a frame, keeping at most [`FRAME_CAPACITY`].
    pub fn from_received(bytes: &[u8]) -> Self {
        let len = bytes.len().min(FRAME_CAPACITY);
        if len < bytes.len() {
            trace!(
                received = bytes.len(),
                kept = len,
                "received frame clamped to capacity"
            );
        }
        let mut frame = Self::new();
        frame.buf[..len].copy_from_slice(&bytes[..len]);
        frame.len = len;
        frame
    }

    /// Frame contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Bytes used.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no record has been packed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes still free.
    pub fn remaining(&self) -> usize {
        FRAME_CAPACITY - self.len
    }

    /// Whether a record with `payload_len` bytes of payload still fits.
    pub fn fits(&self, payload_len: usize) -> bool {
        RECORD_HEADER_SIZE + payload_len <= self.remaining()
    }

    /// Drop all contents.
    pub fn clear(&mut self) {
        self.buf = [0u8; FRAME_CAPACITY];
        self.len = 0;
    }

    /// Append one sub-record.
    pub fn push_record(&mut self, program: u8, payload: &[u8]) -> Result<()> {
        encode_record(program, payload, self)
    }

    /// Iterate over the sub-records in this frame.
    pub fn records(&self) -> SubRecords<'_> {
        decode_records(self.as_bytes())
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("len", &self.len)
            .field("bytes", &format_args!("{:02X?}", self.as_bytes()))
            .finish()
    }
}

/// Append a sub-record to a frame.
///
/// Wire format:
/// ```text
/// ┌────────────┬────────────┬──────────────────┬────────────┬─────
/// │ Program    │ Length     │ Payload          │ Program    │ ...
/// │ (1B)       │ (1B)       │ (Length bytes)   │ (1B)       │
/// └────────────┴────────────┴──────────────────┴────────────┴─────
/// ```
/// Records are packed back-to-back; the sum of `2 + Length` over one frame
/// never exceeds [`FRAME_CAPACITY`]. On error the frame is left unchanged.
pub fn encode_record(program: u8, payload: &[u8], dst: &mut Frame) -> Result<()> {
    if is_reserved(program) {
        return Err(FrameError::ReservedProgram(program));
    }
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    if !dst.fits(payload.len()) {
        return Err(FrameError::FrameFull {
            needed: RECORD_HEADER_SIZE + payload.len(),
            remaining: dst.remaining(),
        });
    }

    let start = dst.len;
    dst.buf[start] = program;
    dst.buf[start + 1] = payload.len() as u8;
    dst.buf[start + RECORD_HEADER_SIZE..start + RECORD_HEADER_SIZE + payload.len()]
        .copy_from_slice(payload);
    dst.len += RECORD_HEADER_SIZE + payload.len();
    Ok(())
}

/// Parse the sub-records of a received frame.
///
/// `0x00` and `0xFF` in program-ID position are skipped one byte at a time.
/// A record whose length byte is missing or whose payload would run past
/// the end of `bytes` yields one error and ends the iteration; records
/// before it are still yielded.
pub fn decode_records(bytes: &[u8]) -> SubRecords<'_> {
    SubRecords {
        bytes,
        pos: 0,
        done: false,
    }
}

/// Iterator over the sub-records of one frame. See [`decode_records`].
#[derive(Debug, Clone)]
pub struct SubRecords<'a> {
    bytes: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Iterator for SubRecords<'a> {
    type Item = Result<SubRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let bytes = self.bytes;
        while self.pos < bytes.len() {
            let offset = self.pos;
            let program = bytes[offset];
            if is_padding(program) {
                self.pos += 1;
                continue;
            }

            let Some(&declared) = bytes.get(offset + 1) else {
                self.done = true;
                return Some(Err(FrameError::TruncatedHeader { offset }));
            };
            let declared = usize::from(declared);
            let start = offset + RECORD_HEADER_SIZE;
            let end = start + declared;
            if end > bytes.len() {
                self.done = true;
                return Some(Err(FrameError::TruncatedRecord {
                    offset,
                    declared,
                    available: bytes.len() - start,
                }));
            }

            self.pos = end;
            return Some(Ok(SubRecord::new(program, &bytes[start..end])));
        }

        self.done = true;
        None
    }
}

impl std::iter::FusedIterator for SubRecords<'_> {}
