//! Transceiver capability interface for pktlink.
//!
//! Everything above this crate talks to a radio only through the
//! [`Transceiver`] trait: select a destination, write a frame, flush it,
//! poll for inbound frames and move between power states.
//!
//! This is the lowest layer of pktlink. [`MemoryRadio`] is an in-process
//! implementation used for tests and demos; hardware drivers implement the
//! trait directly.

pub mod address;
pub mod error;
pub mod memory;
pub mod traits;

pub use address::{Address, ADDRESS_LEN};
pub use error::{RadioError, Result};
pub use memory::{Ether, MemoryRadio, RadioEvent, RX_FIFO_DEPTH};
pub use traits::{RadioState, Transceiver, MAX_FRAME_LEN};
