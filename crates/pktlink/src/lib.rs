//! Program multiplexing for 32-byte packet radios.
//!
//! pktlink sits between numbered application channels ("programs") and a
//! radio that can only move opaque frames of up to 32 bytes. Small messages
//! for the same destination are packed into shared frames on the way out,
//! and split apart and routed per program on the way in.
//!
//! # Crate Structure
//!
//! - [`radio`]: transceiver capability, addresses, and an in-memory radio
//! - [`frame`]: sub-record packing and bounds-checked parsing
//! - [`mux`]: outbound queue, registration table and the [`mux::Multiplexer`]
//!   facade (behind `mux` feature)
//! - [`logging`]: subscriber setup for binaries (behind `logging` feature)

/// Re-export radio types.
pub mod radio {
    pub use pktlink_radio::*;
}

/// Re-export frame types.
pub mod frame {
    pub use pktlink_frame::*;
}

/// Re-export multiplexer types (requires `mux` feature).
#[cfg(feature = "mux")]
pub mod mux {
    pub use pktlink_mux::*;
}

#[cfg(feature = "logging")]
pub mod logging;
