use pktlink_radio::{RadioState, Transceiver};

/// Operating mode of the multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Listen whenever not transmitting.
    #[default]
    Bidirectional,
    /// Never listen; sleep the radio after every flush.
    TransmitOnly,
}

impl Mode {
    /// Mode for a transmit-only flag.
    pub fn from_tx_only(tx_only: bool) -> Self {
        if tx_only {
            Mode::TransmitOnly
        } else {
            Mode::Bidirectional
        }
    }

    /// Whether this is [`Mode::TransmitOnly`].
    pub fn is_tx_only(self) -> bool {
        self == Mode::TransmitOnly
    }
}

/// Applies mode transitions to a transceiver.
///
/// Transitions happen only through [`ModeController::switch`]; nothing here
/// changes mode on its own.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ModeController {
    mode: Mode,
}

impl ModeController {
    pub(crate) fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    /// Bring the radio into the resting state for the current mode.
    pub(crate) fn start<R: Transceiver>(&self, radio: &mut R) -> pktlink_radio::Result<()> {
        match self.mode {
            Mode::Bidirectional => radio.enable_rx(),
            Mode::TransmitOnly => Ok(()),
        }
    }

    /// Record `mode` and move the radio to match.
    ///
    /// Entering transmit-only stops receive and sleeps at once; the sleep is
    /// attempted even if stopping receive fails, and the first error is
    /// returned. Leaving it starts receive unless the radio is already
    /// receiving or mid-transmit.
    pub(crate) fn switch<R: Transceiver>(
        &mut self,
        radio: &mut R,
        mode: Mode,
    ) -> pktlink_radio::Result<()> {
        self.mode = mode;
        match mode {
            Mode::TransmitOnly => {
                let disabled = radio.disable_rx();
                let slept = radio.deep_sleep();
                disabled.and(slept)
            }
            Mode::Bidirectional => match radio.state() {
                RadioState::Receiving | RadioState::Transmitting => Ok(()),
                _ => radio.enable_rx(),
            },
        }
    }

    /// Called after a flush that touched the radio.
    pub(crate) fn after_flush<R: Transceiver>(&self, radio: &mut R) -> pktlink_radio::Result<()> {
        match self.mode {
            Mode::TransmitOnly => radio.deep_sleep(),
            Mode::Bidirectional => Ok(()),
        }
    }
}
