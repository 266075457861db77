//! Frame grabber
//!
//! Ties a [`ByteSource`] to the decoder, the ping-pong queue and the
//! counters. It is driven entirely by the application's super loop:
//!
//! ```ignore
//! let mut grabber = FrameGrabber::new(source, GrabberConfig::default());
//! loop {
//!     grabber.grab()?;
//!     if let Some(frame) = grabber.read() {
//!         // use frame.points
//!     }
//! }
//! ```
//!
//! Nothing happens between calls: there are no timers, threads or
//! interrupts, and neither call ever waits past the source's poll budget.

use ilidar_hal::ByteSource;
use ilidar_protocol::Frame;

use crate::config::{GrabberConfig, READ_BUFFER_SIZE};
use crate::counters::{CounterBank, CounterKind};
use crate::decoder::{Decoder, SyncState};
use crate::queue::{PingPong, PushOutcome};

/// Summary of one [`FrameGrabber::grab`] or [`FrameGrabber::feed`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GrabReport {
    /// Bytes decoded
    pub bytes: usize,
    /// Validated frames produced
    pub frames: usize,
    /// Batches lost to write overrun
    pub overruns: usize,
    /// The source ran out of poll budget
    pub timed_out: bool,
}

/// Serial stream to frame queue
pub struct FrameGrabber<S> {
    source: S,
    config: GrabberConfig,
    decoder: Decoder,
    queue: PingPong,
    counters: CounterBank,
    buf: [u8; READ_BUFFER_SIZE],
}

impl<S: ByteSource> FrameGrabber<S> {
    /// Create a grabber over `source`
    pub fn new(source: S, config: GrabberConfig) -> Self {
        Self {
            source,
            config: config.normalized(),
            decoder: Decoder::new(),
            queue: PingPong::new(),
            counters: CounterBank::new(),
            buf: [0; READ_BUFFER_SIZE],
        }
    }

    /// Reset counters, decoder position and buffered frames
    pub fn init(&mut self) {
        self.counters.reset();
        self.decoder.reset();
        self.queue.reset();
    }

    /// Poll the source once and decode everything it returned
    ///
    /// Transport errors are returned as-is; corrupt or misaligned data is
    /// never an error here, only a counter increment.
    pub fn grab(&mut self) -> Result<GrabReport, S::Error> {
        let max = self.config.read_max;
        let outcome = self
            .source
            .read_available(&mut self.buf[..max], self.config.read_request)?;

        let count = outcome.count.min(max);
        let mut report = ingest(
            &self.buf[..count],
            &mut self.decoder,
            &mut self.queue,
            &mut self.counters,
        );
        report.timed_out = outcome.timed_out;
        Ok(report)
    }

    /// Decode bytes already in hand, bypassing the source
    pub fn feed(&mut self, bytes: &[u8]) -> GrabReport {
        ingest(bytes, &mut self.decoder, &mut self.queue, &mut self.counters)
    }

    /// Take the next completed frame, if a full buffer is ready
    pub fn read(&mut self) -> Option<&Frame> {
        self.queue.read_next(&mut self.counters)
    }

    /// Frames ready to be read without another swap
    pub fn available(&self) -> usize {
        self.queue.available()
    }

    pub fn counters(&self) -> &CounterBank {
        &self.counters
    }

    /// Mutable access, for clearing change flags
    pub fn counters_mut(&mut self) -> &mut CounterBank {
        &mut self.counters
    }

    /// Shorthand for the counter value of `kind`
    pub fn counter(&self, kind: CounterKind) -> u32 {
        self.counters.get(kind)
    }

    pub fn state(&self) -> SyncState {
        self.decoder.state()
    }

    pub fn is_synced(&self) -> bool {
        self.decoder.is_synced()
    }

    /// Wrapping sum of every byte decoded since `init`
    pub fn stream_sum(&self) -> u32 {
        self.decoder.stream_sum()
    }

    pub fn config(&self) -> &GrabberConfig {
        &self.config
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Shut down and give the source back to the caller
    pub fn release(self) -> S {
        self.source
    }
}

/// Run a chunk through the decoder, queueing every frame it yields
fn ingest(
    bytes: &[u8],
    decoder: &mut Decoder,
    queue: &mut PingPong,
    counters: &mut CounterBank,
) -> GrabReport {
    let mut report = GrabReport {
        bytes: bytes.len(),
        ..GrabReport::default()
    };

    for &byte in bytes {
        if let Some(frame) = decoder.step(byte, counters) {
            report.frames += 1;
            if queue.push(frame, counters) == PushOutcome::Overrun {
                report.overruns += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilidar_hal::ReadOutcome;
    use ilidar_protocol::FRAME_SIZE;

    use crate::queue::QUEUE_CAPACITY;

    /// Source replaying a fixed byte slice in reads of at most `chunk` bytes
    struct Replay<'a> {
        data: &'a [u8],
        pos: usize,
        chunk: usize,
        fail: bool,
    }

    impl<'a> Replay<'a> {
        fn new(data: &'a [u8], chunk: usize) -> Self {
            Self {
                data,
                pos: 0,
                chunk,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(&[], 1)
            }
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    struct PortClosed;

    impl ByteSource for Replay<'_> {
        type Error = PortClosed;

        fn read_available(
            &mut self,
            buf: &mut [u8],
            requested: usize,
        ) -> Result<ReadOutcome, PortClosed> {
            if self.fail {
                return Err(PortClosed);
            }
            let n = buf.len().min(self.chunk).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(ReadOutcome {
                count: n,
                timed_out: n < requested,
            })
        }
    }

    fn frame_bytes(seq: u16) -> [u8; FRAME_SIZE] {
        let mut buffer = [0u8; FRAME_SIZE];
        Frame::new(seq).encode(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_grab_reports_timeout_and_bytes() {
        let data = [0u8; 50];
        let source = Replay::new(&data, 1000);
        let mut grabber = FrameGrabber::new(source, GrabberConfig::default());

        let report = grabber.grab().unwrap();
        assert_eq!(report.bytes, 50);
        assert_eq!(report.frames, 0);
        assert!(report.timed_out);
        assert_eq!(grabber.counter(CounterKind::Bytes), 50);
    }

    #[test]
    fn test_grab_respects_read_max() {
        let data = [0u8; 300];
        let source = Replay::new(&data, 1000);
        let mut grabber = FrameGrabber::new(source, GrabberConfig::new(10, 64));

        assert_eq!(grabber.grab().unwrap().bytes, 64);
        assert_eq!(grabber.source_mut().pos, 64);
    }

    #[test]
    fn test_transport_error_propagates() {
        let source = Replay::failing();
        let mut grabber = FrameGrabber::new(source, GrabberConfig::default());
        assert_eq!(grabber.grab(), Err(PortClosed));
        assert_eq!(grabber.counter(CounterKind::Bytes), 0);
    }

    #[test]
    fn test_frames_reach_reader_after_full_buffer() {
        let mut grabber = FrameGrabber::new(Replay::new(&[], 0), GrabberConfig::default());

        for seq in 0..QUEUE_CAPACITY as u16 {
            assert!(grabber.read().is_none());
            let report = grabber.feed(&frame_bytes(seq));
            assert_eq!(report.frames, 1);
        }

        assert_eq!(grabber.available(), QUEUE_CAPACITY);
        for seq in 0..QUEUE_CAPACITY as u16 {
            assert_eq!(grabber.read().map(|f| f.sequence), Some(seq));
        }
        assert!(grabber.read().is_none());
        assert_eq!(grabber.counter(CounterKind::BufferProcessed), 1);
    }

    #[test]
    fn test_init_resets_everything() {
        let mut grabber = FrameGrabber::new(Replay::new(&[], 0), GrabberConfig::default());
        grabber.feed(&frame_bytes(1));
        assert!(grabber.is_synced());

        grabber.init();
        assert_eq!(grabber.counter(CounterKind::Frames), 0);
        assert!(!grabber.counters().any_changed());
        assert_eq!(grabber.state(), SyncState::NoSync);
        assert_eq!(grabber.stream_sum(), 0);
        assert_eq!(grabber.available(), 0);
    }

    #[test]
    fn test_release_returns_source() {
        let data = [1u8, 2, 3];
        let source = Replay::new(&data, 2);
        let mut grabber = FrameGrabber::new(source, GrabberConfig::default());
        grabber.grab().unwrap();

        let source = grabber.release();
        assert_eq!(source.pos, 2);
    }
}
