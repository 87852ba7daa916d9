//! Program ID sentinels.
//!
//! Program IDs are single bytes. `0xFF` marks an empty slot and `0x00` is
//! reserved; both read as padding inside a frame. IDs `0x01..=0xFE` are
//! available to applications.

/// Empty-slot marker; also trailing fill in a received frame.
pub const EMPTY: u8 = 0xFF;

/// Reserved "unknown" ID; zero bytes in a frame are padding.
pub const UNASSIGNED: u8 = 0x00;

/// First application program ID.
pub const FIRST_PROGRAM: u8 = 0x01;

/// Last application program ID.
pub const LAST_PROGRAM: u8 = 0xFE;

/// Returns true if the ID cannot be used by an application.
pub fn is_reserved(id: u8) -> bool {
    id == EMPTY || id == UNASSIGNED
}

/// Returns true if a byte in program-ID position is fill, not a record.
pub fn is_padding(byte: u8) -> bool {
    is_reserved(byte)
}
