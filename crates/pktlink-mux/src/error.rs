use crate::registry::Hook;

/// Errors returned by multiplexer operations.
///
/// Every variant is a rejected request: when one is returned, nothing was
/// changed.
#[derive(Debug, thiserror::Error)]
pub enum MuxError {
    /// The program ID is one of the reserved sentinels.
    #[error("program id {0:#04x} is reserved")]
    ReservedProgram(u8),

    /// Every outbound slot is occupied; flush to make room.
    #[error("outbound queue full ({depth} slots)")]
    QueueFull { depth: usize },

    /// A handler is already attached for this program.
    #[error("program {0} already registered")]
    AlreadyRegistered(u8),

    /// Every registration slot is occupied.
    #[error("registration table full ({capacity} slots)")]
    RegistryFull { capacity: usize },

    /// No handler is attached for this program.
    #[error("program {0} not registered")]
    NotRegistered(u8),

    /// The hook already has a handler.
    #[error("{0} hook already attached")]
    HookAttached(Hook),

    /// The hook has no handler to detach.
    #[error("{0} hook not attached")]
    HookDetached(Hook),

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A configuration document could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MuxError>;
