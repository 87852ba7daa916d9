use pktlink_radio::{Address, Transceiver};
use tracing::debug;

use crate::codec::Frame;
use crate::error::Result;

/// Transmits complete frames through any [`Transceiver`].
///
/// Each transmission selects the destination, loads the frame and flushes
/// the radio before returning.
pub struct FrameWriter<T> {
    inner: T,
}

impl<T: Transceiver> FrameWriter<T> {
    /// Create a new frame writer.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Discard stale transmit state before a burst.
    pub fn purge(&mut self) -> Result<()> {
        self.inner.purge()?;
        Ok(())
    }

    /// Send one frame to `address` (blocking). Empty frames are not sent.
    pub fn transmit(&mut self, address: &Address, frame: &Frame) -> Result<()> {
        if frame.is_empty() {
            return Ok(());
        }

        debug!(%address, bytes = frame.len(), "sending radio frame");
        self.inner.set_tx_address(address)?;
        self.inner.write(frame.as_bytes())?;
        self.inner.flush()?;
        Ok(())
    }

    /// Borrow the underlying transceiver.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying transceiver.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner transceiver.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use pktlink_radio::{MemoryRadio, RadioError, RadioEvent};

    use super::*;
    use crate::error::FrameError;

    const HERE: Address = Address::new([1, 1, 1, 1, 1]);
    const THERE: Address = Address::new([2, 2, 2, 2, 2]);

    #[test]
    fn transmit_sets_address_writes_and_flushes() {
        let mut writer = FrameWriter::new(MemoryRadio::new(HERE));
        let mut frame = Frame::new();
        frame.push_record(1, b"hi").unwrap();

        writer.transmit(&THERE, &frame).unwrap();

        let radio = writer.into_inner();
        assert_eq!(radio.events().len(), 3);
        assert_eq!(radio.events()[0], RadioEvent::SetTxAddress(THERE));
        assert!(matches!(
            &radio.events()[1],
            RadioEvent::Write(b) if b[..] == [1u8, 2, b'h', b'i']
        ));
        assert_eq!(radio.events()[2], RadioEvent::Flush);
        assert_eq!(radio.transmitted()[0].0, THERE);
    }

    #[test]
    fn empty_frame_is_not_sent() {
        let mut writer = FrameWriter::new(MemoryRadio::new(HERE));
        writer.transmit(&THERE, &Frame::new()).unwrap();
        assert!(writer.get_ref().events().is_empty());
    }

    #[test]
    fn radio_failure_propagates() {
        let mut radio = MemoryRadio::new(HERE);
        radio.shutdown().unwrap();
        let mut writer = FrameWriter::new(&mut radio);
        let mut frame = Frame::new();
        frame.push_record(1, b"x").unwrap();

        let err = writer.transmit(&THERE, &frame).unwrap_err();
        assert!(matches!(err, FrameError::Radio(RadioError::PoweredOff)));
        assert!(writer.get_ref().transmitted().is_empty());
    }

    #[test]
    fn each_transmit_is_one_frame_on_air() {
        let mut writer = FrameWriter::new(MemoryRadio::new(HERE));
        let mut frame = Frame::new();
        frame.push_record(3, b"abc").unwrap();
        writer.transmit(&THERE, &frame).unwrap();
        writer.transmit(&THERE, &frame).unwrap();
        assert_eq!(writer.get_mut().transmitted().len(), 2);
    }
}
