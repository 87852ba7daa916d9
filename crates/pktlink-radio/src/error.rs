/// Errors that can occur in transceiver operations.
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    /// A write would exceed the radio's frame size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The radio has been shut down and no longer accepts commands.
    #[error("radio is powered off")]
    PoweredOff,

    /// An address string could not be parsed.
    #[error("invalid radio address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: &'static str },

    /// A hardware driver reported a fault.
    #[error("transceiver fault: {0}")]
    Fault(String),
}

pub type Result<T> = std::result::Result<T, RadioError>;
