//! Serial link configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default sensor baud rate
pub const DEFAULT_BAUDRATE: u32 = 460_800;

/// Default poll budget before a read reports a timeout
pub const DEFAULT_TIMEOUT_POLLS: u32 = 50_000;

/// Serial link configuration
///
/// The timeout is not a wall-clock value: it counts unsuccessful polls of
/// the input queue and has to be tuned to the baud rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Unsuccessful polls before a read gives up waiting
    pub timeout_polls: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
            timeout_polls: DEFAULT_TIMEOUT_POLLS,
        }
    }
}

impl SerialConfig {
    /// Create a config with the given baud rate and the default poll budget
    pub const fn new(baudrate: u32) -> Self {
        Self {
            baudrate,
            timeout_polls: DEFAULT_TIMEOUT_POLLS,
        }
    }

    /// Replace the poll budget
    pub const fn with_timeout_polls(mut self, timeout_polls: u32) -> Self {
        self.timeout_polls = timeout_polls;
        self
    }
}
