//! Byte source abstraction
//!
//! The grabber only ever asks a transport for "whatever bytes are already
//! queued, up to N". Opening, closing and enumerating ports is the
//! transport's business.

/// Result of a single poll of a [`ByteSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadOutcome {
    /// Number of bytes written to the front of the caller's buffer
    pub count: usize,
    /// The poll budget ran out before `requested` bytes were queued
    ///
    /// Data can be returned and a timeout reported by the same call.
    pub timed_out: bool,
}

impl ReadOutcome {
    /// An empty read that did not time out
    pub const fn empty() -> Self {
        Self {
            count: 0,
            timed_out: false,
        }
    }
}

/// Non-blocking source of raw sensor bytes
pub trait ByteSource {
    /// Error type for transport failures
    type Error;

    /// Read queued bytes into `buf`
    ///
    /// Waits, for at most the source's configured poll budget, until
    /// `requested` bytes are queued, then copies up to `buf.len()` bytes.
    /// Must never block past that budget.
    fn read_available(
        &mut self,
        buf: &mut [u8],
        requested: usize,
    ) -> Result<ReadOutcome, Self::Error>;
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    type Error = T::Error;

    fn read_available(
        &mut self,
        buf: &mut [u8],
        requested: usize,
    ) -> Result<ReadOutcome, Self::Error> {
        (**self).read_available(buf, requested)
    }
}
