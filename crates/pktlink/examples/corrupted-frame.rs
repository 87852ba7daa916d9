//! Corrupted-frame example: a frame whose second record lies about its length.
//!
//! Run with:
//!   cargo run --example corrupted-frame --features logging
//!
//! The first record is delivered, the rest of the frame is discarded, and a
//! warning is logged.

use clap::Parser;
use pktlink::frame::{decode_records, Frame, SubRecord};
use pktlink::logging::LogArgs;
use pktlink::mux::Multiplexer;
use pktlink::radio::{Address, MemoryRadio};

#[derive(Parser, Debug)]
#[command(about)]
struct Cli {
    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    cli.log.init();

    let mut frame = Frame::new();
    frame.push_record(3, b"ok")?;
    frame.push_record(4, b"cut")?;

    // Bump the second record's length byte past the end of the frame.
    let mut bytes = frame.as_bytes().to_vec();
    bytes[5] = 30;
    eprintln!("frame on the air: {:02X?}", bytes);

    for record in decode_records(&bytes) {
        match record {
            Ok(record) => eprintln!("  record program={} len={}", record.program(), record.len()),
            Err(err) => eprintln!("  stop: {err}"),
        }
    }

    let radio = MemoryRadio::new(Address::new([0xE7; 5]));
    radio.inject(&bytes);

    let mut mux = Multiplexer::new(radio);
    mux.attach_all(|record: &SubRecord<'_>| {
        eprintln!(
            "[observer] program {} payload {:?}",
            record.program(),
            String::from_utf8_lossy(record.payload())
        );
    })?;

    let report = mux.poll();
    eprintln!(
        "poll: {} frame(s), {} record(s), {} corrupted",
        report.frames, report.records, report.corrupted
    );
    Ok(())
}
