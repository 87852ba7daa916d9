//! Two-node example: a sensor packs readings for a gateway into shared frames.
//!
//! Run with:
//!   cargo run --example two-node --features logging
//!
//! Pass `-- --log-level debug` (or set `PKTLINK_LOG=debug`) to see each frame, and
//! `--log-format json` for JSON.

use clap::Parser;
use pktlink::frame::SubRecord;
use pktlink::logging::LogArgs;
use pktlink::mux::Multiplexer;
use pktlink::radio::{Address, Ether, Transceiver};

const TEMPERATURE: u8 = 1;
const HUMIDITY: u8 = 2;
const COMMAND: u8 = 9;

#[derive(Parser, Debug)]
#[command(about)]
struct Cli {
    #[command(flatten)]
    log: LogArgs,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    cli.log.init();

    let gateway_addr: Address = "E7:E7:E7:E7:E7".parse()?;
    let sensor_addr: Address = "C2C2C2C2C2".parse()?;

    let ether = Ether::new();
    let mut gateway = Multiplexer::new(ether.radio(gateway_addr));
    let mut sensor = Multiplexer::new(ether.radio(sensor_addr));
    gateway.begin();
    sensor.begin();

    gateway.attach_program(TEMPERATURE, |record: &SubRecord<'_>| {
        if let [hi, lo] = record.payload() {
            let centi = i16::from_be_bytes([*hi, *lo]);
            eprintln!("[gateway] temperature {}.{:02} C", centi / 100, centi % 100);
        }
    })?;
    gateway.attach_program(HUMIDITY, |record: &SubRecord<'_>| {
        eprintln!("[gateway] humidity {:?} %", record.payload().first());
    })?;
    gateway.attach_unknown(|record: &SubRecord<'_>| {
        eprintln!(
            "[gateway] unhandled program {} ({} bytes)",
            record.program(),
            record.len()
        );
    })?;

    sensor.attach_program(COMMAND, |record: &SubRecord<'_>| {
        eprintln!(
            "[sensor] command {}",
            String::from_utf8_lossy(record.payload())
        );
    })?;

    sensor.send(TEMPERATURE, &gateway_addr, &2150i16.to_be_bytes())?;
    sensor.send(HUMIDITY, &gateway_addr, &[48])?;
    sensor.send(42, &gateway_addr, b"spare")?;
    let sent = sensor.flush();
    eprintln!(
        "[sensor] flushed {} records in {} frame(s)",
        sent.records, sent.frames
    );

    let received = gateway.poll();
    eprintln!(
        "[gateway] {} frame(s), {} record(s)",
        received.frames, received.records
    );

    gateway.send(COMMAND, &sensor_addr, b"interval=30")?;
    gateway.flush();
    sensor.poll();

    let radio = sensor.end();
    eprintln!("[sensor] radio left in {:?}", radio.state());
    Ok(())
}
