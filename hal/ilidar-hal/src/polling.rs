//! Polling adapter over a driver input queue
//!
//! Serial drivers usually expose two primitives: how many bytes are sitting
//! in the receive queue, and a read that returns immediately with whatever
//! is there. [`PollingSource`] turns those into a [`ByteSource`].

use crate::serial::SerialConfig;
use crate::source::{ByteSource, ReadOutcome};

/// Driver-level receive queue
pub trait InputQueue {
    /// Error type for driver failures
    type Error;

    /// Number of bytes currently queued
    fn bytes_waiting(&mut self) -> Result<usize, Self::Error>;

    /// Read up to `buf.len()` queued bytes without waiting
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// [`ByteSource`] that spins on an [`InputQueue`] for a bounded number of polls
#[derive(Debug)]
pub struct PollingSource<Q> {
    queue: Q,
    timeout_polls: u32,
}

impl<Q: InputQueue> PollingSource<Q> {
    /// Wrap a queue with an explicit poll budget
    pub fn new(queue: Q, timeout_polls: u32) -> Self {
        Self {
            queue,
            timeout_polls,
        }
    }

    /// Wrap a queue using the poll budget from a serial config
    pub fn with_config(queue: Q, config: &SerialConfig) -> Self {
        Self::new(queue, config.timeout_polls)
    }

    /// Access the underlying queue
    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    /// Give back the underlying queue
    pub fn into_inner(self) -> Q {
        self.queue
    }
}

impl<Q: InputQueue> ByteSource for PollingSource<Q> {
    type Error = Q::Error;

    fn read_available(
        &mut self,
        buf: &mut [u8],
        requested: usize,
    ) -> Result<ReadOutcome, Self::Error> {
        // Never wait for more than the caller can take
        let requested = requested.min(buf.len());

        let mut waiting = self.queue.bytes_waiting()?;
        let mut polls = 0u32;
        let mut timed_out = false;
        while waiting < requested {
            polls += 1;
            if polls >= self.timeout_polls {
                timed_out = true;
                break;
            }
            waiting = self.queue.bytes_waiting()?;
        }

        let wanted = waiting.min(buf.len());
        if wanted == 0 {
            return Ok(ReadOutcome {
                count: 0,
                timed_out,
            });
        }

        let count = self.queue.read_nonblocking(&mut buf[..wanted])?;
        Ok(ReadOutcome { count, timed_out })
    }
}
