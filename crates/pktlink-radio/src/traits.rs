use crate::address::Address;
use crate::error::Result;

/// Largest frame a transceiver carries in one write (nRF24L01+ payload size).
pub const MAX_FRAME_LEN: usize = 32;

/// Power/activity state reported by a transceiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioState {
    /// Powered and idle (standby); not listening.
    Idle,
    /// Listening for inbound frames.
    Receiving,
    /// A frame is loaded or on the air.
    Transmitting,
    /// Lowest-power state; wakes on the next write or receive enable.
    DeepSleep,
    /// Shut down.
    Off,
}

/// The capability set pktlink needs from a radio.
///
/// All calls are blocking and synchronous. Implementations own their
/// hardware timing; nothing above this trait adds timeouts.
pub trait Transceiver {
    /// Discard any buffered transmit state before a burst.
    fn purge(&mut self) -> Result<()>;

    /// Select the destination of subsequent writes.
    fn set_tx_address(&mut self, address: &Address) -> Result<()>;

    /// Load one frame (at most [`MAX_FRAME_LEN`] bytes) for transmission.
    fn write(&mut self, frame: &[u8]) -> Result<()>;

    /// Put loaded bytes on the air and wait for the radio to settle.
    fn flush(&mut self) -> Result<()>;

    /// Whether an inbound frame is waiting.
    ///
    /// With `peek` set, implementations may answer from a cheap status line
    /// without touching the receive FIFO.
    fn has_inbound(&mut self, peek: bool) -> bool;

    /// Copy the oldest inbound frame into `buf` and return its length.
    ///
    /// Returns 0 when nothing is waiting.
    fn read_inbound(&mut self, buf: &mut [u8]) -> usize;

    /// Start listening.
    fn enable_rx(&mut self) -> Result<()>;

    /// Stop listening.
    fn disable_rx(&mut self) -> Result<()>;

    /// Enter the lowest-power state.
    fn deep_sleep(&mut self) -> Result<()>;

    /// Power the radio down for good.
    fn shutdown(&mut self) -> Result<()>;

    /// Current radio state.
    fn state(&self) -> RadioState;
}

impl<T: Transceiver + ?Sized> Transceiver for &mut T {
    fn purge(&mut self) -> Result<()> {
        (**self).purge()
    }

    fn set_tx_address(&mut self, address: &Address) -> Result<()> {
        (**self).set_tx_address(address)
    }

    fn write(&mut self, frame: &[u8]) -> Result<()> {
        (**self).write(frame)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn has_inbound(&mut self, peek: bool) -> bool {
        (**self).has_inbound(peek)
    }

    fn read_inbound(&mut self, buf: &mut [u8]) -> usize {
        (**self).read_inbound(buf)
    }

    fn enable_rx(&mut self) -> Result<()> {
        (**self).enable_rx()
    }

    fn disable_rx(&mut self) -> Result<()> {
        (**self).disable_rx()
    }

    fn deep_sleep(&mut self) -> Result<()> {
        (**self).deep_sleep()
    }

    fn shutdown(&mut self) -> Result<()> {
        (**self).shutdown()
    }

    fn state(&self) -> RadioState {
        (**self).state()
    }
}

impl<T: Transceiver + ?Sized> Transceiver for Box<T> {
    fn purge(&mut self) -> Result<()> {
        (**self).purge()
    }

    fn set_tx_address(&mut self, address: &Address) -> Result<()> {
        (**self).set_tx_address(address)
    }

    fn write(&mut self, frame: &[u8]) -> Result<()> {
        (**self).write(frame)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn has_inbound(&mut self, peek: bool) -> bool {
        (**self).has_inbound(peek)
    }

    fn read_inbound(&mut self, buf: &mut [u8]) -> usize {
        (**self).read_inbound(buf)
    }

    fn enable_rx(&mut self) -> Result<()> {
        (**self).enable_rx()
    }

    fn disable_rx(&mut self) -> Result<()> {
        (**self).disable_rx()
    }

    fn deep_sleep(&mut self) -> Result<()> {
        (**self).deep_sleep()
    }

    fn shutdown(&mut self) -> Result<()> {
        (**self).shutdown()
    }

    fn state(&self) -> RadioState {
        (**self).state()
    }
}
