use serde::{Deserialize, Serialize};

use crate::error::{MuxError, Result};

/// Default number of outbound queue slots.
pub const DEFAULT_QUEUE_DEPTH: usize = 3;

/// Default number of program registrations.
pub const DEFAULT_MAX_PROGRAMS: usize = 4;

/// Sizing and mode for a [`Multiplexer`](crate::Multiplexer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MuxConfig {
    /// Outbound queue slots. Must be non-zero.
    pub queue_depth: usize,
    /// Program registration slots. Must be non-zero.
    pub max_programs: usize,
    /// Sleep the radio after every flush and never listen.
    pub tx_only: bool,
}

impl MuxConfig {
    /// Reject zero-sized tables.
    pub fn validate(&self) -> Result<()> {
        if self.queue_depth == 0 {
            return Err(MuxError::InvalidConfig(
                "queue_depth must be greater than zero".to_string(),
            ));
        }
        if self.max_programs == 0 {
            return Err(MuxError::InvalidConfig(
                "max_programs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            queue_depth: DEFAULT_QUEUE_DEPTH,
            max_programs: DEFAULT_MAX_PROGRAMS,
            tx_only: false,
        }
    }
}
