//! Receive path: split frames into sub-records and dispatch them.

use pktlink_frame::{decode_records, FrameReader};
use pktlink_radio::Transceiver;
use tracing::{debug, trace, warn};

use crate::registry::RegistrationTable;

/// Outcome of dispatching one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameDispatch {
    /// Records handed to the registration table.
    pub records: usize,
    /// Whether parsing stopped early on a length that ran past the frame.
    pub corrupted: bool,
}

/// What a poll did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Frames read from the transceiver.
    pub frames: usize,
    /// Records dispatched across all frames.
    pub records: usize,
    /// Frames abandoned part-way through.
    pub corrupted: usize,
}

/// Parse one frame and route each record through `registry`.
///
/// Records before a corrupt one are dispatched exactly once; everything from
/// the corrupt record on is discarded.
pub fn dispatch_frame(bytes: &[u8], registry: &mut RegistrationTable) -> FrameDispatch {
    let mut outcome = FrameDispatch::default();
    for record in decode_records(bytes) {
        match record {
            Ok(record) => {
                trace!(
                    program = record.program(),
                    bytes = record.len(),
                    "dispatching record"
                );
                registry.dispatch(&record);
                outcome.records += 1;
            }
            Err(err) => {
                warn!(error = %err, frame_len = bytes.len(), "discarding rest of corrupted frame");
                outcome.corrupted = true;
            }
        }
    }
    outcome
}

/// Dispatch every frame waiting in `reader`.
pub(crate) fn drain<T: Transceiver>(
    reader: &mut FrameReader<T>,
    registry: &mut RegistrationTable,
) -> PollReport {
    let mut report = PollReport::default();
    while let Some(frame) = reader.read_frame() {
        let outcome = dispatch_frame(frame.as_bytes(), registry);
        report.frames += 1;
        report.records += outcome.records;
        if outcome.corrupted {
            report.corrupted += 1;
        }
    }
    if report.frames > 0 {
        debug!(
            frames = report.frames,
            records = report.records,
            corrupted = report.corrupted,
            "poll complete"
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pktlink_frame::SubRecord;
    use pktlink_radio::{Address, MemoryRadio};

    use super::*;

    type Log = Arc<Mutex<Vec<(u8, Vec<u8>)>>>;

    fn observing(capacity: usize) -> (RegistrationTable, Log) {
        let log = Log::default();
        let mut table = RegistrationTable::new(capacity);
        let sink = Arc::clone(&log);
        table
            .attach_all(move |record: &SubRecord<'_>| {
                sink.lock()
                    .unwrap()
                    .push((record.program(), record.payload().to_vec()));
            })
            .unwrap();
        (table, log)
    }

    #[test]
    fn dispatches_every_record_in_order() {
        let (mut table, log) = observing(1);
        let outcome = dispatch_frame(&[1, 1, 0xAA, 2, 2, 0xBB, 0xCC], &mut table);

        assert_eq!(
            outcome,
            FrameDispatch {
                records: 2,
                corrupted: false
            }
        );
        assert_eq!(
            *log.lock().unwrap(),
            vec![(1, vec![0xAA]), (2, vec![0xBB, 0xCC])]
        );
    }

    #[test]
    fn padding_is_skipped() {
        let (mut table, log) = observing(1);
        let outcome = dispatch_frame(&[0xFF, 0x00, 3, 1, 0x33, 0xFF, 0xFF], &mut table);
        assert_eq!(outcome.records, 1);
        assert!(!outcome.corrupted);
        assert_eq!(*log.lock().unwrap(), vec![(3, vec![0x33])]);
    }

    #[test]
    fn corrupt_length_stops_after_earlier_records() {
        let (mut table, log) = observing(1);
        // second record claims 9 bytes with 2 left
        let outcome = dispatch_frame(&[1, 1, 0xAA, 2, 9, 0xBB, 0xCC], &mut table);

        assert_eq!(outcome.records, 1);
        assert!(outcome.corrupted);
        assert_eq!(*log.lock().unwrap(), vec![(1, vec![0xAA])]);
    }

    #[test]
    fn missing_length_byte_is_corruption() {
        let (mut table, log) = observing(1);
        let outcome = dispatch_frame(&[1, 0, 4], &mut table);
        assert_eq!(outcome.records, 1);
        assert!(outcome.corrupted);
        assert_eq!(*log.lock().unwrap(), vec![(1, vec![])]);
    }

    #[test]
    fn no_declared_length_reads_past_frame() {
        for declared in 0..=u8::MAX {
            let (mut table, log) = observing(1);
            let frame = [7, declared, 0xFF, 0xFF, 0xFF];
            let outcome = dispatch_frame(&frame, &mut table);

            let fits = 2 + declared as usize <= frame.len();
            assert_eq!(outcome.records, usize::from(fits), "declared={declared}");
            assert_eq!(outcome.corrupted, !fits, "declared={declared}");
            for (_, payload) in log.lock().unwrap().iter() {
                assert_eq!(payload.len(), declared as usize);
            }
        }
    }

    #[test]
    fn drain_reads_every_waiting_frame() {
        let radio = MemoryRadio::new(Address::new([9; 5]));
        radio.inject(&[1, 1, b'a']);
        radio.inject(&[2, 5, b'b']);
        radio.inject(&[3, 1, b'c', 4, 1, b'd']);

        let (mut table, log) = observing(1);
        let mut reader = FrameReader::new(radio);
        let report = drain(&mut reader, &mut table);

        assert_eq!(
            report,
            PollReport {
                frames: 3,
                records: 3,
                corrupted: 1
            }
        );
        let programs: Vec<u8> = log.lock().unwrap().iter().map(|(p, _)| *p).collect();
        assert_eq!(programs, vec![1, 3, 4]);
        assert!(!reader.available());
    }

    #[test]
    fn drain_with_nothing_waiting_is_empty() {
        let (mut table, _) = observing(1);
        let mut reader = FrameReader::new(MemoryRadio::new(Address::new([9; 5])));
        assert_eq!(drain(&mut reader, &mut table), PollReport::default());
    }
}
