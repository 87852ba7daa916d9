use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::address::Address;
use crate::error::{RadioError, Result};
use crate::traits::{RadioState, Transceiver, MAX_FRAME_LEN};

/// Inbound frames a radio buffers before dropping new arrivals.
pub const RX_FIFO_DEPTH: usize = 3;

/// One call made against a [`MemoryRadio`], in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent {
    Purge,
    SetTxAddress(Address),
    Write(Bytes),
    Flush,
    EnableRx,
    DisableRx,
    DeepSleep,
    Shutdown,
}

#[derive(Debug, Default)]
struct Inbox {
    fifo: VecDeque<Bytes>,
    listening: bool,
    dropped: usize,
}

impl Inbox {
    fn push(&mut self, frame: Bytes) -> bool {
        if self.fifo.len() >= RX_FIFO_DEPTH {
            self.dropped += 1;
            return false;
        }
        self.fifo.push_back(frame);
        true
    }
}

struct Station {
    id: u64,
    address: Address,
    inbox: Weak<Mutex<Inbox>>,
}

#[derive(Default)]
struct EtherInner {
    stations: Vec<Station>,
    next_id: u64,
}

/// A shared in-process medium connecting [`MemoryRadio`]s.
///
/// A flushed frame is delivered to every other radio on the same ether whose
/// own address matches the destination and which is currently listening.
#[derive(Clone, Default)]
pub struct Ether {
    inner: Arc<Mutex<EtherInner>>,
}

impl Ether {
    /// Create an empty medium.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a radio listening on `address` and join it to this medium.
    pub fn radio(&self, address: Address) -> MemoryRadio {
        let inbox = Arc::new(Mutex::new(Inbox::default()));
        let id = {
            let mut inner = lock(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.stations.push(Station {
                id,
                address,
                inbox: Arc::downgrade(&inbox),
            });
            id
        };

        MemoryRadio {
            id,
            address,
            ether: self.clone(),
            inbox,
            state: RadioState::Idle,
            rx_enabled: false,
            tx_address: None,
            pending: BytesMut::with_capacity(MAX_FRAME_LEN),
            events: Vec::new(),
            transmitted: Vec::new(),
        }
    }

    /// Number of radios still attached.
    pub fn station_count(&self) -> usize {
        let mut inner = lock(&self.inner);
        inner.stations.retain(|s| s.inbox.strong_count() > 0);
        inner.stations.len()
    }

    fn deliver(&self, from: u64, to: &Address, frame: &Bytes) -> usize {
        let mut inner = lock(&self.inner);
        inner.stations.retain(|s| s.inbox.strong_count() > 0);

        let mut delivered = 0;
        for station in inner
            .stations
            .iter()
            .filter(|s| s.id != from && s.address == *to)
        {
            let Some(inbox) = station.inbox.upgrade() else {
                continue;
            };
            let mut inbox = lock(&inbox);
            if !inbox.listening {
                continue;
            }
            if inbox.push(frame.clone()) {
                delivered += 1;
            } else {
                trace!(address = %to, "receive fifo full; frame dropped");
            }
        }
        delivered
    }
}

impl fmt::Debug for Ether {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ether")
            .field("stations", &self.station_count())
            .finish()
    }
}

/// In-memory transceiver modelled on the nRF24L01+.
///
/// Writes accumulate in a 32-byte transmit buffer until `flush`, inbound
/// frames queue in a 3-deep FIFO, and every call is recorded as a
/// [`RadioEvent`] so callers can assert on exact transceiver interaction.
pub struct MemoryRadio {
    id: u64,
    address: Address,
    ether: Ether,
    inbox: Arc<Mutex<Inbox>>,
    state: RadioState,
    rx_enabled: bool,
    tx_address: Option<Address>,
    pending: BytesMut,
    events: Vec<RadioEvent>,
    transmitted: Vec<(Address, Bytes)>,
}

impl MemoryRadio {
    /// Create a radio on its own private medium.
    pub fn new(address: Address) -> Self {
        Ether::new().radio(address)
    }

    /// The address this radio receives on.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The currently selected destination, if any.
    pub fn tx_address(&self) -> Option<Address> {
        self.tx_address
    }

    /// Place raw bytes directly into the receive FIFO, as if they had
    /// arrived over the air. Returns `false` if the FIFO was full.
    pub fn inject(&self, frame: &[u8]) -> bool {
        lock(&self.inbox).push(Bytes::copy_from_slice(frame))
    }

    /// Frames waiting in the receive FIFO.
    pub fn pending_inbound(&self) -> usize {
        lock(&self.inbox).fifo.len()
    }

    /// Frames dropped because the receive FIFO was full.
    pub fn dropped_inbound(&self) -> usize {
        lock(&self.inbox).dropped
    }

    /// Every call made against this radio so far.
    pub fn events(&self) -> &[RadioEvent] {
        &self.events
    }

    /// Forget recorded events.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Frames put on the air, with their destination.
    pub fn transmitted(&self) -> &[(Address, Bytes)] {
        &self.transmitted
    }

    fn ensure_powered(&self) -> Result<()> {
        if self.state == RadioState::Off {
            return Err(RadioError::PoweredOff);
        }
        Ok(())
    }

    fn set_state(&mut self, state: RadioState) {
        self.state = state;
        lock(&self.inbox).listening = state == RadioState::Receiving;
    }
}

impl Transceiver for MemoryRadio {
    fn purge(&mut self) -> Result<()> {
        self.ensure_powered()?;
        self.events.push(RadioEvent::Purge);
        self.pending.clear();
        Ok(())
    }

    fn set_tx_address(&mut self, address: &Address) -> Result<()> {
        self.ensure_powered()?;
        self.events.push(RadioEvent::SetTxAddress(*address));
        self.tx_address = Some(*address);
        Ok(())
    }

    fn write(&mut self, frame: &[u8]) -> Result<()> {
        self.ensure_powered()?;
        let size = self.pending.len() + frame.len();
        if size > MAX_FRAME_LEN {
            return Err(RadioError::FrameTooLarge {
                size,
                max: MAX_FRAME_LEN,
            });
        }
        self.events
            .push(RadioEvent::Write(Bytes::copy_from_slice(frame)));
        self.pending.extend_from_slice(frame);
        self.set_state(RadioState::Transmitting);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_powered()?;
        self.events.push(RadioEvent::Flush);
        if self.state != RadioState::Transmitting {
            return Ok(());
        }

        let frame = self.pending.split().freeze();
        let to = self.tx_address.unwrap_or_default();
        let receivers = self.ether.deliver(self.id, &to, &frame);
        debug!(address = %to, bytes = frame.len(), receivers, "memory radio transmitted frame");
        self.transmitted.push((to, frame));

        let next = if self.rx_enabled {
            RadioState::Receiving
        } else {
            RadioState::Idle
        };
        self.set_state(next);
        Ok(())
    }

    fn has_inbound(&mut self, _peek: bool) -> bool {
        !lock(&self.inbox).fifo.is_empty()
    }

    fn read_inbound(&mut self, buf: &mut [u8]) -> usize {
        let Some(frame) = lock(&self.inbox).fifo.pop_front() else {
            return 0;
        };
        let n = frame.len().min(buf.len());
        buf[..n].copy_from_slice(&frame[..n]);
        n
    }

    fn enable_rx(&mut self) -> Result<()> {
        self.ensure_powered()?;
        self.events.push(RadioEvent::EnableRx);
        self.rx_enabled = true;
        if self.state != RadioState::Transmitting {
            self.set_state(RadioState::Receiving);
        }
        Ok(())
    }

    fn disable_rx(&mut self) -> Result<()> {
        self.ensure_powered()?;
        self.events.push(RadioEvent::DisableRx);
        self.rx_enabled = false;
        if self.state == RadioState::Receiving {
            self.set_state(RadioState::Idle);
        }
        Ok(())
    }

    fn deep_sleep(&mut self) -> Result<()> {
        self.ensure_powered()?;
        self.events.push(RadioEvent::DeepSleep);
        self.rx_enabled = false;
        self.set_state(RadioState::DeepSleep);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.events.push(RadioEvent::Shutdown);
        self.rx_enabled = false;
        self.pending.clear();
        self.set_state(RadioState::Off);
        Ok(())
    }

    fn state(&self) -> RadioState {
        self.state
    }
}

impl fmt::Debug for MemoryRadio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRadio")
            .field("address", &self.address)
            .field("state", &self.state)
            .field("rx_enabled", &self.rx_enabled)
            .field("tx_address", &self.tx_address)
            .field("pending_inbound", &self.pending_inbound())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Address = Address::new([0xA0, 0xA1, 0xA2, 0xA3, 0xA4]);
    const B: Address = Address::new([0xB0, 0xB1, 0xB2, 0xB3, 0xB4]);

    fn drain(radio: &mut MemoryRadio) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        let mut buf = [0u8; MAX_FRAME_LEN];
        while radio.has_inbound(false) {
            let n = radio.read_inbound(&mut buf);
            frames.push(buf[..n].to_vec());
        }
        frames
    }

    #[test]
    fn flush_delivers_to_listening_radio_with_matching_address() {
        let ether = Ether::new();
        let mut tx = ether.radio(A);
        let mut rx = ether.radio(B);
        rx.enable_rx().unwrap();

        tx.set_tx_address(&B).unwrap();
        tx.write(b"hello").unwrap();
        assert_eq!(tx.state(), RadioState::Transmitting);
        tx.flush().unwrap();

        assert_eq!(tx.state(), RadioState::Idle);
        assert_eq!(drain(&mut rx), vec![b"hello".to_vec()]);
        assert_eq!(tx.transmitted().len(), 1);
        assert_eq!(tx.transmitted()[0].0, B);
    }

    #[test]
    fn radio_not_listening_hears_nothing() {
        let ether = Ether::new();
        let mut tx = ether.radio(A);
        let mut rx = ether.radio(B);

        tx.set_tx_address(&B).unwrap();
        tx.write(b"lost").unwrap();
        tx.flush().unwrap();

        assert!(!rx.has_inbound(false));
    }

    #[test]
    fn wrong_address_is_ignored() {
        let ether = Ether::new();
        let mut tx = ether.radio(A);
        let mut rx = ether.radio(B);
        rx.enable_rx().unwrap();

        tx.set_tx_address(&A).unwrap();
        tx.write(b"self").unwrap();
        tx.flush().unwrap();

        assert!(!rx.has_inbound(false));
    }

    #[test]
    fn receive_fifo_drops_when_full() {
        let radio = MemoryRadio::new(A);
        for i in 0..RX_FIFO_DEPTH {
            assert!(radio.inject(&[i as u8]));
        }
        assert!(!radio.inject(&[0xEE]));
        assert_eq!(radio.pending_inbound(), RX_FIFO_DEPTH);
        assert_eq!(radio.dropped_inbound(), 1);
    }

    #[test]
    fn write_rejects_more_than_one_frame_of_bytes() {
        let mut radio = MemoryRadio::new(A);
        radio.write(&[0u8; 20]).unwrap();
        let err = radio.write(&[0u8; 13]).unwrap_err();
        assert!(matches!(err, RadioError::FrameTooLarge { size: 33, max: 32 }));
    }

    #[test]
    fn purge_discards_unflushed_bytes() {
        let mut radio = MemoryRadio::new(A);
        radio.write(b"stale").unwrap();
        radio.purge().unwrap();
        radio.write(&[0u8; MAX_FRAME_LEN]).unwrap();
    }

    #[test]
    fn flush_returns_to_receive_when_enabled() {
        let mut radio = MemoryRadio::new(A);
        radio.enable_rx().unwrap();
        radio.write(b"x").unwrap();
        radio.flush().unwrap();
        assert_eq!(radio.state(), RadioState::Receiving);
    }

    #[test]
    fn deep_sleep_stops_listening() {
        let ether = Ether::new();
        let mut tx = ether.radio(A);
        let mut rx = ether.radio(B);
        rx.enable_rx().unwrap();
        rx.deep_sleep().unwrap();
        assert_eq!(rx.state(), RadioState::DeepSleep);

        tx.set_tx_address(&B).unwrap();
        tx.write(b"zz").unwrap();
        tx.flush().unwrap();
        assert!(!rx.has_inbound(false));
    }

    #[test]
    fn shutdown_rejects_further_commands() {
        let mut radio = MemoryRadio::new(A);
        radio.shutdown().unwrap();
        assert_eq!(radio.state(), RadioState::Off);
        assert!(matches!(radio.write(b"x"), Err(RadioError::PoweredOff)));
        assert!(matches!(radio.enable_rx(), Err(RadioError::PoweredOff)));
    }

    #[test]
    fn read_inbound_truncates_to_buffer() {
        let mut radio = MemoryRadio::new(A);
        radio.inject(b"abcdef");
        let mut buf = [0u8; 4];
        assert_eq!(radio.read_inbound(&mut buf), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(radio.read_inbound(&mut buf), 0);
    }

    #[test]
    fn events_record_call_order() {
        let mut radio = MemoryRadio::new(A);
        radio.purge().unwrap();
        radio.set_tx_address(&B).unwrap();
        radio.write(b"ab").unwrap();
        radio.flush().unwrap();

        assert_eq!(
            radio.events(),
            &[
                RadioEvent::Purge,
                RadioEvent::SetTxAddress(B),
                RadioEvent::Write(Bytes::from_static(b"ab")),
                RadioEvent::Flush,
            ]
        );
        radio.clear_events();
        assert!(radio.events().is_empty());
    }

    #[test]
    fn dropped_radio_leaves_the_ether() {
        let ether = Ether::new();
        let keep = ether.radio(A);
        {
            let _gone = ether.radio(B);
            assert_eq!(ether.station_count(), 2);
        }
        assert_eq!(ether.station_count(), 1);
        drop(keep);
    }

    #[test]
    fn works_through_mutable_reference() {
        fn send_via<T: Transceiver>(mut radio: T) {
            radio.set_tx_address(&B).unwrap();
            radio.write(b"ref").unwrap();
            radio.flush().unwrap();
        }

        let mut radio = MemoryRadio::new(A);
        send_via(&mut radio);
        assert_eq!(radio.transmitted().len(), 1);
    }
}
