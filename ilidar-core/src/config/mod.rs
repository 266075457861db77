//! Grabber configuration
//!
//! Plain data with defaults taken from the sensor's reference tools. With
//! the `serde` feature the config can be stored as postcard binary data,
//! the same way the rest of a firmware image keeps its settings in flash.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of the grabber's read buffer; the most bytes one `grab` can take
pub const READ_BUFFER_SIZE: usize = 1024;

/// Default number of bytes a `grab` waits for before decoding
pub const DEFAULT_READ_REQUEST: usize = 200;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Failed to serialize
    Serialize,
    /// Failed to deserialize
    Deserialize,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::Serialize => f.write_str("config serialization failed"),
            ConfigError::Deserialize => f.write_str("config deserialization failed"),
        }
    }
}

/// Frame grabber configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GrabberConfig {
    /// Bytes to wait for per poll before decoding what arrived
    pub read_request: usize,
    /// Most bytes taken per poll (capped at [`READ_BUFFER_SIZE`])
    pub read_max: usize,
}

impl Default for GrabberConfig {
    fn default() -> Self {
        Self {
            read_request: DEFAULT_READ_REQUEST,
            read_max: READ_BUFFER_SIZE,
        }
    }
}

impl GrabberConfig {
    pub const fn new(read_request: usize, read_max: usize) -> Self {
        Self {
            read_request,
            read_max,
        }
    }

    /// Clamp the config into what the grabber can honor
    ///
    /// `read_max` lands in `1..=READ_BUFFER_SIZE` and `read_request` never
    /// exceeds it.
    pub fn normalized(self) -> Self {
        let read_max = self.read_max.clamp(1, READ_BUFFER_SIZE);
        Self {
            read_request: self.read_request.min(read_max),
            read_max,
        }
    }

    /// Load a config from postcard binary data
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)
    }

    /// Store this config as postcard binary data
    ///
    /// Returns the used part of `buf`.
    #[cfg(feature = "serde")]
    pub fn to_slice<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Serialize)
    }
}
