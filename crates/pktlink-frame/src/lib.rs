//! Sub-record framing for 32-byte radio frames.
//!
//! This is the core value-add layer of pktlink. A frame is a run of
//! sub-records packed back-to-back with no padding:
//! - a 1-byte program ID
//! - a 1-byte payload length
//! - the payload
//!
//! Packing never overflows a frame, and parsing never reads past one, no
//! matter what the length bytes claim.

pub mod codec;
pub mod error;
pub mod program;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_records, encode_record, Frame, SubRecord, SubRecords, FRAME_CAPACITY, MAX_PAYLOAD,
    RECORD_HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use program::{is_padding, is_reserved, EMPTY, FIRST_PROGRAM, LAST_PROGRAM, UNASSIGNED};
pub use reader::FrameReader;
pub use writer::FrameWriter;
