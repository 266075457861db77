//! Adapter for `embedded-io` devices
//!
//! Any blocking reader that can report readiness (a buffered UART, a USB CDC
//! endpoint) becomes a [`ByteSource`] without ever blocking: `read` is only
//! called after `read_ready` says at least one byte is there.

use embedded_io::{Read, ReadReady};

use crate::source::{ByteSource, ReadOutcome};

/// [`ByteSource`] over an `embedded_io::Read + ReadReady` device
#[derive(Debug)]
pub struct IoSource<T> {
    inner: T,
    timeout_polls: u32,
}

impl<T: Read + ReadReady> IoSource<T> {
    /// Wrap a device with a poll budget
    pub fn new(inner: T, timeout_polls: u32) -> Self {
        Self {
            inner,
            timeout_polls,
        }
    }

    /// Give back the wrapped device
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + ReadReady> ByteSource for IoSource<T> {
    type Error = T::Error;

    fn read_available(
        &mut self,
        buf: &mut [u8],
        requested: usize,
    ) -> Result<ReadOutcome, Self::Error> {
        let requested = requested.min(buf.len());
        let mut count = 0;
        let mut polls = 0u32;
        let mut timed_out = false;

        while count < buf.len() {
            if self.inner.read_ready()? {
                let n = self.inner.read(&mut buf[count..])?;
                if n == 0 {
                    // EOF
                    break;
                }
                count += n;
                if count >= requested {
                    break;
                }
            } else if count >= requested {
                break;
            } else {
                polls += 1;
                if polls >= self.timeout_polls {
                    timed_out = true;
                    break;
                }
            }
        }

        Ok(ReadOutcome { count, timed_out })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_io::ErrorType;

    /// Device handing out at most `chunk` bytes per read
    struct Chunked<'a> {
        data: &'a [u8],
        pos: usize,
        chunk: usize,
    }

    impl<'a> Chunked<'a> {
        fn new(data: &'a [u8], chunk: usize) -> Self {
            Self {
                data,
                pos: 0,
                chunk,
            }
        }
    }

    impl ErrorType for Chunked<'_> {
        type Error = Infallible;
    }

    impl Read for Chunked<'_> {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
            let n = buf.len().min(self.chunk).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    impl ReadReady for Chunked<'_> {
        fn read_ready(&mut self) -> Result<bool, Infallible> {
            Ok(self.pos < self.data.len())
        }
    }

    #[test]
    fn test_reads_until_requested() {
        let data = [9u8; 20];
        let mut source = IoSource::new(Chunked::new(&data, 4), 10);
        let mut buf = [0u8; 32];

        let outcome = source.read_available(&mut buf, 10).unwrap();
        assert_eq!(outcome.count, 12);
        assert!(!outcome.timed_out);
    }

    #[test]
    fn test_short_stream_times_out() {
        let data = [1u8, 2, 3];
        let mut source = IoSource::new(Chunked::new(&data, 4), 3);
        let mut buf = [0u8; 32];

        let outcome = source.read_available(&mut buf, 10).unwrap();
        assert_eq!(outcome.count, 3);
        assert!(outcome.timed_out);
        assert_eq!(&buf[..3], &data);
    }

    #[test]
    fn test_zero_request_returns_immediately() {
        let mut source = IoSource::new(Chunked::new(&[], 4), 1000);
        let mut buf = [0u8; 8];

        let outcome = source.read_available(&mut buf, 0).unwrap();
        assert_eq!(outcome, ReadOutcome::empty());
    }
}
