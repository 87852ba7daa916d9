use pktlink_radio::Transceiver;

use crate::codec::{Frame, FRAME_CAPACITY};

/// Pulls received frames out of any [`Transceiver`].
pub struct FrameReader<T> {
    inner: T,
    buf: [u8; FRAME_CAPACITY],
}

impl<T: Transceiver> FrameReader<T> {
    /// Create a new frame reader.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: [0u8; FRAME_CAPACITY],
        }
    }

    /// Whether the transceiver holds an unread frame.
    pub fn available(&mut self) -> bool {
        self.inner.has_inbound(false)
    }

    /// Read the next received frame, or `None` if nothing is waiting.
    ///
    /// A length reported beyond the receive buffer is clamped to it.
    pub fn read_frame(&mut self) -> Option<Frame> {
        if !self.inner.has_inbound(false) {
            return None;
        }
        self.buf = [0u8; FRAME_CAPACITY];
        let len = self.inner.read_inbound(&mut self.buf).min(FRAME_CAPACITY);
        Some(Frame::from_received(&self.buf[..len]))
    }

    /// Borrow the underlying transceiver.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying transceiver.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner transceiver.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
