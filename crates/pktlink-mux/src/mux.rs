use std::mem;

use pktlink_frame::{FrameReader, FrameWriter};
use pktlink_radio::{Address, Transceiver};
use tracing::{info, trace, warn};

use crate::aggregator::{self, FlushReport};
use crate::config::MuxConfig;
use crate::demux::{self, PollReport};
use crate::error::{MuxError, Result};
use crate::mode::{Mode, ModeController};
use crate::queue::OutboundQueue;
use crate::registry::{Handler, RegistrationTable};

/// Multiplexes numbered programs over one radio.
///
/// Outbound messages are queued with [`send`](Self::send) and packed into
/// frames by [`flush`](Self::flush). Inbound frames are split and handed to
/// registered handlers by [`poll`](Self::poll). Nothing happens in the
/// background; the caller decides when to flush and poll.
///
/// Radio failures during a flush or poll are logged and counted in the
/// returned report. They are never returned as errors.
#[derive(Debug)]
pub struct Multiplexer<R> {
    radio: R,
    queue: OutboundQueue,
    registry: RegistrationTable,
    mode: ModeController,
    config: MuxConfig,
}

impl<R: Transceiver> Multiplexer<R> {
    /// Create a multiplexer with the default configuration.
    pub fn new(radio: R) -> Self {
        let config = MuxConfig::default();
        Self {
            radio,
            queue: OutboundQueue::new(config.queue_depth),
            registry: RegistrationTable::new(config.max_programs),
            mode: ModeController::new(Mode::from_tx_only(config.tx_only)),
            config,
        }
    }

    /// Create a multiplexer sized and moded by `config`.
    pub fn with_config(radio: R, config: MuxConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            radio,
            queue: OutboundQueue::new(config.queue_depth),
            registry: RegistrationTable::new(config.max_programs),
            mode: ModeController::new(Mode::from_tx_only(config.tx_only)),
            config,
        })
    }

    /// Bring the radio up for the configured mode.
    ///
    /// Bidirectional mode starts listening; transmit-only leaves the radio
    /// alone until the first flush.
    pub fn begin(&mut self) {
        info!(
            mode = ?self.mode.mode(),
            queue_depth = self.config.queue_depth,
            max_programs = self.config.max_programs,
            "multiplexer starting"
        );
        if let Err(err) = self.mode.start(&mut self.radio) {
            warn!(error = %err, "radio failed to start");
        }
    }

    /// Shut the radio down and hand it back. Queued messages are dropped.
    pub fn end(mut self) -> R {
        if !self.queue.is_empty() {
            warn!(dropped = self.queue.len(), "ending with unsent messages");
        }
        if let Err(err) = self.radio.shutdown() {
            warn!(error = %err, "radio shutdown failed");
        }
        info!("multiplexer stopped");
        self.radio
    }

    /// Replace the radio and return the previous one.
    ///
    /// The new radio is used as-is; call [`begin`](Self::begin) to bring it
    /// into the current mode.
    pub fn set_transceiver(&mut self, radio: R) -> R {
        mem::replace(&mut self.radio, radio)
    }

    /// Reallocate the outbound queue with `depth` slots.
    ///
    /// Every queued message is discarded.
    pub fn set_queue_depth(&mut self, depth: usize) -> Result<()> {
        if depth == 0 {
            return Err(MuxError::InvalidConfig(
                "queue_depth must be greater than zero".to_string(),
            ));
        }
        let discarded = self.queue.len();
        self.queue = OutboundQueue::new(depth);
        self.config.queue_depth = depth;
        if discarded > 0 {
            warn!(depth, discarded, "outbound queue reallocated; queued messages lost");
        } else {
            info!(depth, "outbound queue reallocated");
        }
        Ok(())
    }

    /// Reallocate the registration table with `capacity` slots.
    ///
    /// Every program registration is discarded. The unknown-program and
    /// observe-all hooks are kept.
    pub fn set_max_programs(&mut self, capacity: usize) -> Result<()> {
        if capacity == 0 {
            return Err(MuxError::InvalidConfig(
                "max_programs must be greater than zero".to_string(),
            ));
        }
        let discarded = self.registry.reset(capacity);
        self.config.max_programs = capacity;
        if discarded > 0 {
            warn!(capacity, discarded, "registration table reallocated; handlers lost");
        } else {
            info!(capacity, "registration table reallocated");
        }
        Ok(())
    }

    /// Queue `payload` for `program` at `destination`.
    ///
    /// Fails without side effect on a reserved program ID or a full queue.
    /// Payloads longer than [`MAX_PAYLOAD`](pktlink_frame::MAX_PAYLOAD) are
    /// accepted here and dropped by the next flush.
    pub fn send(&mut self, program: u8, destination: &Address, payload: &[u8]) -> Result<()> {
        let slot = self.queue.enqueue(program, destination, payload)?;
        trace!(program, address = %destination, bytes = payload.len(), slot, "message queued");
        Ok(())
    }

    /// Transmit everything queued.
    ///
    /// With nothing queued the radio is not touched at all. In transmit-only
    /// mode the radio is put to sleep after a flush that had work to do.
    pub fn flush(&mut self) -> FlushReport {
        if self.queue.is_empty() {
            return FlushReport::default();
        }

        let report = {
            let mut writer = FrameWriter::new(&mut self.radio);
            aggregator::drain(&mut self.queue, &mut writer)
        };
        if let Err(err) = self.mode.after_flush(&mut self.radio) {
            warn!(error = %err, "radio failed to sleep after flush");
        }
        report
    }

    /// Switch between transmit-only and bidirectional operation.
    pub fn set_tx_only(&mut self, tx_only: bool) {
        let mode = Mode::from_tx_only(tx_only);
        self.config.tx_only = tx_only;
        info!(?mode, "mode change");
        if let Err(err) = self.mode.switch(&mut self.radio, mode) {
            warn!(error = %err, ?mode, "radio failed to follow mode change");
        }
    }

    /// Current operating mode.
    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    /// Whether a received frame is waiting. Does not consume it.
    pub fn available(&mut self) -> bool {
        self.radio.has_inbound(false)
    }

    /// Read and dispatch every waiting frame.
    pub fn poll(&mut self) -> PollReport {
        let mut reader = FrameReader::new(&mut self.radio);
        demux::drain(&mut reader, &mut self.registry)
    }

    /// Attach `handler` for `program`.
    pub fn attach_program<H: Handler + 'static>(&mut self, program: u8, handler: H) -> Result<()> {
        let slot = self.registry.attach(program, handler)?;
        trace!(program, slot, "program attached");
        Ok(())
    }

    /// Detach the handler for `program`.
    pub fn detach_program(&mut self, program: u8) -> Result<()> {
        self.registry.detach(program)?;
        trace!(program, "program detached");
        Ok(())
    }

    /// Attach the handler for records whose program is not registered.
    pub fn attach_unknown<H: Handler + 'static>(&mut self, handler: H) -> Result<()> {
        self.registry.attach_unknown(handler)
    }

    /// Detach the unknown-program handler.
    pub fn detach_unknown(&mut self) -> Result<()> {
        self.registry.detach_unknown()
    }

    /// Attach the handler that observes every record.
    pub fn attach_all<H: Handler + 'static>(&mut self, handler: H) -> Result<()> {
        self.registry.attach_all(handler)
    }

    /// Detach the observe-all handler.
    pub fn detach_all(&mut self) -> Result<()> {
        self.registry.detach_all()
    }

    /// Current configuration.
    pub fn config(&self) -> &MuxConfig {
        &self.config
    }

    /// The outbound queue.
    pub fn queue(&self) -> &OutboundQueue {
        &self.queue
    }

    /// The registration table.
    pub fn registry(&self) -> &RegistrationTable {
        &self.registry
    }

    /// Borrow the radio.
    pub fn get_ref(&self) -> &R {
        &self.radio
    }

    /// Mutably borrow the radio.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Consume the multiplexer and return the radio without shutting it down.
    pub fn into_inner(self) -> R {
        self.radio
    }
}
