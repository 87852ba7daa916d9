/// Errors that can occur while packing or parsing frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the per-record maximum.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The record does not fit in the space left in the frame.
    #[error("frame full (record needs {needed} bytes, {remaining} remaining)")]
    FrameFull { needed: usize, remaining: usize },

    /// The program ID is one of the reserved sentinels.
    #[error("program id {0:#04x} is reserved")]
    ReservedProgram(u8),

    /// A record starts at the last byte of the frame, leaving no length byte.
    #[error("record header truncated at offset {offset}")]
    TruncatedHeader { offset: usize },

    /// A record's declared length runs past the end of the frame.
    #[error(
        "record at offset {offset} declares {declared} payload bytes but only {available} remain"
    )]
    TruncatedRecord {
        offset: usize,
        declared: usize,
        available: usize,
    },

    /// The transceiver rejected an operation.
    #[error("radio error: {0}")]
    Radio(#[from] pktlink_radio::RadioError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
