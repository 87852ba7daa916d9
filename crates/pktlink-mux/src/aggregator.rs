//! Transmit path: pack queued messages into frames.
//!
//! The queue is walked once in slot order. Each contiguous run of messages
//! for the same destination is packed greedily into as few frames as it
//! needs. A destination that reappears after a different one starts a new
//! frame; the queue is never sorted by destination first.

use pktlink_frame::{Frame, FrameWriter, MAX_PAYLOAD};
use pktlink_radio::{Address, Transceiver};
use tracing::{debug, warn};

use crate::queue::OutboundQueue;

/// What a flush did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Frames put on the air.
    pub frames: usize,
    /// Messages packed into frames.
    pub records: usize,
    /// Oversized messages dropped without sending.
    pub culled: usize,
    /// Frames the transceiver failed to send.
    pub failed: usize,
}

impl FlushReport {
    /// Whether the flush found nothing to do.
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Drain every queued message through `writer`.
///
/// An empty queue returns at once without touching the transceiver.
pub(crate) fn drain<T: Transceiver>(
    queue: &mut OutboundQueue,
    writer: &mut FrameWriter<T>,
) -> FlushReport {
    let mut report = FlushReport::default();
    let Some(first) = queue.first_occupied() else {
        return report;
    };
    let Some(mut current) = queue.get(first).map(|m| m.destination) else {
        return report;
    };

    if let Err(err) = writer.purge() {
        warn!(error = %err, "transceiver purge failed");
    }

    let mut frame = Frame::new();
    let mut index = first;
    while index < queue.depth() {
        let Some(destination) = queue.get(index).map(|m| m.destination) else {
            index += 1;
            continue;
        };

        if destination != current {
            send(writer, &current, &mut frame, &mut report);
            current = destination;
            continue;
        }

        let Some(message) = queue.take(index) else {
            index += 1;
            continue;
        };
        index += 1;

        if !message.is_packable() {
            warn!(
                program = message.program,
                address = %destination,
                bytes = message.payload.len(),
                max = MAX_PAYLOAD,
                "dropping oversized queued message"
            );
            report.culled += 1;
            continue;
        }

        if !frame.fits(message.payload.len()) {
            send(writer, &current, &mut frame, &mut report);
        }
        match frame.push_record(message.program, &message.payload) {
            Ok(()) => report.records += 1,
            Err(err) => warn!(error = %err, program = message.program, "message not packed"),
        }
    }

    send(writer, &current, &mut frame, &mut report);
    debug!(
        frames = report.frames,
        records = report.records,
        culled = report.culled,
        failed = report.failed,
        "flush complete"
    );
    report
}

/// Transmit `frame` if it holds anything, then empty it.
fn send<T: Transceiver>(
    writer: &mut FrameWriter<T>,
    address: &Address,
    frame: &mut Frame,
    report: &mut FlushReport,
) {
    if frame.is_empty() {
        return;
    }
    match writer.transmit(address, frame) {
        Ok(()) => report.frames += 1,
        Err(err) => {
            warn!(error = %err, %address, bytes = frame.len(), "frame transmit failed");
            report.failed += 1;
        }
    }
    frame.clear();
}
