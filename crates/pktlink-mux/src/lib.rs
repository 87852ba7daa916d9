//! Program multiplexing over a pktlink radio.
//!
//! This is the "just works" layer. Queue small messages per program and
//! destination, flush them as densely packed radio frames, and have inbound
//! frames split apart and handed to the handler registered for each program.

pub mod aggregator;
pub mod config;
pub mod demux;
pub mod error;
pub mod mode;
pub mod mux;
pub mod queue;
pub mod registry;
pub mod slots;

pub use aggregator::FlushReport;
pub use config::{MuxConfig, DEFAULT_MAX_PROGRAMS, DEFAULT_QUEUE_DEPTH};
pub use demux::{dispatch_frame, FrameDispatch, PollReport};
pub use error::{MuxError, Result};
pub use mode::Mode;
pub use mux::Multiplexer;
pub use queue::{OutboundQueue, PendingMessage};
pub use registry::{Handler, Hook, RegistrationTable};
pub use slots::SlotArena;
