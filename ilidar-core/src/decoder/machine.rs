//! Byte-at-a-time frame decoder
//!
//! The decoder is an explicit value: all position state (current state,
//! field accumulators, byte index, running checksum) lives here, so a frame
//! split across any number of reads decodes exactly as if it arrived in one.

use ilidar_protocol::frame::{CHECKSUM_LEN, SEQ_LEN, SIZE_LEN};
use ilidar_protocol::{Frame, BODY_LEN, PAYLOAD_SIZE, SYNC_PATTERN};

use super::state::SyncState;
use crate::counters::{CounterBank, CounterKind};

/// Frame synchronization state machine
#[derive(Debug, Clone)]
pub struct Decoder {
    state: SyncState,
    /// State the previous byte was processed in; a change marks the first
    /// byte of a new field
    last_state: SyncState,
    /// Currently aligned to the stream
    synced: bool,
    /// Alignment was established at least once this session
    first_sync: bool,
    /// Byte index within the current field
    index: usize,
    declared_size: u32,
    /// Sum of SEQ through the last point, as received
    running_sum: u32,
    wire_checksum: u32,
    /// SEQ through the last point
    body: [u8; BODY_LEN],
    /// Sum of every byte ever fed, for link-level debugging
    stream_sum: u32,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Create a decoder in the unsynchronized state
    pub fn new() -> Self {
        Self {
            state: SyncState::NoSync,
            last_state: SyncState::NoSync,
            synced: false,
            first_sync: false,
            index: 0,
            declared_size: 0,
            running_sum: 0,
            wire_checksum: 0,
            body: [0; BODY_LEN],
            stream_sum: 0,
        }
    }

    /// Forget all stream position and history
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current state
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Returns true while aligned to the stream
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Wrapping sum of every byte fed since the last reset
    pub fn stream_sum(&self) -> u32 {
        self.stream_sum
    }

    /// Process a whole chunk, handing every validated frame to `sink`
    ///
    /// Returns the number of frames produced.
    pub fn feed<F>(&mut self, bytes: &[u8], counters: &mut CounterBank, mut sink: F) -> usize
    where
        F: FnMut(Frame),
    {
        let mut frames = 0;
        for &byte in bytes {
            if let Some(frame) = self.step(byte, counters) {
                frames += 1;
                sink(frame);
            }
        }
        frames
    }

    /// Process one byte
    ///
    /// Returns a frame when this byte completes one with a valid checksum.
    /// Stream problems never surface here; they are counted in `counters`.
    pub fn step(&mut self, byte: u8, counters: &mut CounterBank) -> Option<Frame> {
        counters.increment(CounterKind::Bytes);
        self.stream_sum = self.stream_sum.wrapping_add(u32::from(byte));

        let entering = self.state != self.last_state;
        let mut completed = None;

        let next = match self.state {
            SyncState::NoSync => {
                self.synced = false;
                if self.first_sync {
                    counters.increment(CounterKind::LostSyncs);
                    #[cfg(feature = "defmt")]
                    defmt::debug!("sync lost");
                }
                self.search_start(byte)
            }
            SyncState::SyncSearch0 => self.search_start(byte),
            SyncState::SyncSearch1 => Self::search_continue(byte, 1, SyncState::SyncSearch2),
            SyncState::SyncSearch2 => Self::search_continue(byte, 2, SyncState::SyncSearch3),
            SyncState::SyncSearch3 => {
                if byte == SYNC_PATTERN[3] {
                    counters.increment(CounterKind::GoodSyncs);
                    self.first_sync = true;
                    self.synced = true;
                    SyncState::GetSize
                } else {
                    SyncState::SyncSearch0
                }
            }
            SyncState::GetSize => {
                if entering {
                    self.declared_size = 0;
                    self.index = 0;
                }
                self.declared_size |= u32::from(byte) << (self.index * 8);
                self.index += 1;
                if self.index < SIZE_LEN {
                    SyncState::GetSize
                } else if self.declared_size as usize != PAYLOAD_SIZE {
                    counters.increment(CounterKind::SizeErrors);
                    self.synced = false;
                    #[cfg(feature = "defmt")]
                    defmt::warn!("frame size {} != {}", self.declared_size, PAYLOAD_SIZE);
                    SyncState::SyncSearch0
                } else {
                    SyncState::GetSeq
                }
            }
            SyncState::GetSeq => {
                if entering {
                    self.index = 0;
                    self.running_sum = 0;
                }
                self.body[self.index] = byte;
                self.running_sum = self.running_sum.wrapping_add(u32::from(byte));
                self.index += 1;
                if self.index < SEQ_LEN {
                    SyncState::GetSeq
                } else {
                    // Unwritten payload bytes read back as zero
                    self.body[SEQ_LEN..].fill(0);
                    SyncState::GetData
                }
            }
            SyncState::GetData => {
                if entering {
                    self.index = 0;
                }
                match self.body.get_mut(SEQ_LEN + self.index) {
                    Some(slot) => {
                        *slot = byte;
                        self.running_sum = self.running_sum.wrapping_add(u32::from(byte));
                        self.index += 1;
                        let data_len = (self.declared_size as usize)
                            .saturating_sub(SEQ_LEN + CHECKSUM_LEN);
                        if self.index >= data_len {
                            SyncState::GetChecksum
                        } else {
                            SyncState::GetData
                        }
                    }
                    None => {
                        // Cursor ran past the payload buffer
                        counters.increment(CounterKind::InvalidState);
                        SyncState::NoSync
                    }
                }
            }
            SyncState::GetChecksum => {
                if entering {
                    self.wire_checksum = 0;
                    self.index = 0;
                }
                self.wire_checksum |= u32::from(byte) << (self.index * 8);
                self.index += 1;
                if self.index < CHECKSUM_LEN {
                    SyncState::GetChecksum
                } else {
                    if self.wire_checksum == self.running_sum {
                        counters.increment(CounterKind::Frames);
                        completed = Some(Frame::from_body(&self.body, self.wire_checksum));
                    } else {
                        counters.increment(CounterKind::ChecksumErrors);
                        #[cfg(feature = "defmt")]
                        defmt::warn!(
                            "checksum {=u32:#x} != computed {=u32:#x}",
                            self.wire_checksum,
                            self.running_sum
                        );
                    }
                    SyncState::SyncSearch0
                }
            }
        };

        self.last_state = self.state;
        self.state = next;
        completed
    }

    /// Sync byte 0, or where to go when it does not match
    ///
    /// Before the first sync an unaligned stream is scanned quietly; once
    /// aligned, a stray byte drops to [`SyncState::NoSync`] so the loss
    /// gets counted.
    fn search_start(&self, byte: u8) -> SyncState {
        if byte == SYNC_PATTERN[0] {
            SyncState::SyncSearch1
        } else if self.synced {
            SyncState::NoSync
        } else {
            SyncState::SyncSearch0
        }
    }

    /// Sync bytes 1-2
    ///
    /// A mismatching byte is consumed, not retried as byte 0.
    fn search_continue(byte: u8, position: usize, next: SyncState) -> SyncState {
        if byte == SYNC_PATTERN[position] {
            next
        } else {
            SyncState::SyncSearch0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilidar_protocol::{Point, FRAME_SIZE};

    fn wire(frame: &Frame) -> [u8; FRAME_SIZE] {
        let mut buffer = [0u8; FRAME_SIZE];
        frame.encode(&mut buffer).unwrap();
        buffer
    }

    fn run(decoder: &mut Decoder, counters: &mut CounterBank, bytes: &[u8]) -> Option<Frame> {
        let mut last = None;
        decoder.feed(bytes, counters, |frame| last = Some(frame));
        last
    }

    #[test]
    fn test_single_frame() {
        let mut frame = Frame::new(1);
        frame.points[3] = Point::new(10, -20, 30);
        frame.seal();

        let mut decoder = Decoder::new();
        let mut counters = CounterBank::new();
        let decoded = run(&mut decoder, &mut counters, &wire(&frame)).unwrap();

        assert_eq!(decoded, frame);
        assert_eq!(counters.get(CounterKind::Frames), 1);
        assert_eq!(counters.get(CounterKind::GoodSyncs), 1);
        assert_eq!(counters.get(CounterKind::Bytes), FRAME_SIZE as u32);
        assert!(!counters.errors_changed());
        assert_eq!(decoder.state(), SyncState::SyncSearch0);
        assert!(decoder.is_synced());
    }

    #[test]
    fn test_garbage_before_first_sync_is_quiet() {
        let mut decoder = Decoder::new();
        let mut counters = CounterBank::new();
        let garbage = [0x00, 0x13, 0x5A, 0xA5, 0x00, 0xFF];
        assert!(run(&mut decoder, &mut counters, &garbage).is_none());

        assert_eq!(counters.get(CounterKind::LostSyncs), 0);
        assert!(!counters.errors_changed());
        assert!(!decoder.is_synced());
        assert_eq!(decoder.state(), SyncState::SyncSearch0);

        let frame = Frame::new(9);
        assert_eq!(run(&mut decoder, &mut counters, &wire(&frame)), Some(frame));
    }

    #[test]
    fn test_mismatching_byte_is_consumed() {
        let mut decoder = Decoder::new();
        let mut counters = CounterBank::new();

        // 5A A5 5A then 5A: the fourth byte fails sync byte 3 and is not
        // retried as sync byte 0
        run(&mut decoder, &mut counters, &[0x5A, 0xA5, 0x5A]);
        assert_eq!(decoder.state(), SyncState::SyncSearch3);
        decoder.step(0x5A, &mut counters);
        assert_eq!(decoder.state(), SyncState::SyncSearch0);

        decoder.reset();
        counters.reset();
        for (byte, expected) in [
            (0x5A, SyncState::SyncSearch1),
            (0x5A, SyncState::SyncSearch0),
            (0x5A, SyncState::SyncSearch1),
            (0xA5, SyncState::SyncSearch2),
            (0xA5, SyncState::SyncSearch0),
        ] {
            decoder.step(byte, &mut counters);
            assert_eq!(decoder.state(), expected);
        }
        assert_eq!(counters.get(CounterKind::GoodSyncs), 0);
    }

    #[test]
    fn test_partial_prefix_swallows_following_frame() {
        let mut stream = [0u8; 3 + 2 * FRAME_SIZE];
        stream[..3].copy_from_slice(&[0x5A, 0xA5, 0x5A]);
        stream[3..3 + FRAME_SIZE].copy_from_slice(&wire(&Frame::new(2)));
        stream[3 + FRAME_SIZE..].copy_from_slice(&wire(&Frame::new(3)));

        let mut decoder = Decoder::new();
        let mut counters = CounterBank::new();
        let mut sequences = [0u16; 1];
        let produced = decoder.feed(&stream, &mut counters, |frame| {
            sequences[0] = frame.sequence;
        });

        // The first frame's leading 5A fails the pending sync byte 3, so
        // that frame is never aligned; the next one is
        assert_eq!(produced, 1);
        assert_eq!(sequences[0], 3);
        assert_eq!(counters.get(CounterKind::GoodSyncs), 1);
        assert_eq!(counters.get(CounterKind::Frames), 1);
        assert_eq!(counters.get(CounterKind::LostSyncs), 0);
    }

    #[test]
    fn test_size_error_skips_payload_states() {
        let mut bytes = wire(&Frame::new(1));
        bytes[4..8].copy_from_slice(&17u32.to_le_bytes());

        let mut decoder = Decoder::new();
        let mut counters = CounterBank::new();
        for &byte in &bytes[..8] {
            decoder.step(byte, &mut counters);
            assert_ne!(decoder.state(), SyncState::GetSeq);
        }

        assert_eq!(counters.get(CounterKind::SizeErrors), 1);
        assert_eq!(decoder.state(), SyncState::SyncSearch0);
        assert!(!decoder.is_synced());
        assert!(counters.errors_changed());
    }

    #[test]
    fn test_checksum_error() {
        let mut bytes = wire(&Frame::new(1));
        bytes[500] ^= 0x10;

        let mut decoder = Decoder::new();
        let mut counters = CounterBank::new();
        assert!(run(&mut decoder, &mut counters, &bytes).is_none());

        assert_eq!(counters.get(CounterKind::ChecksumErrors), 1);
        assert_eq!(counters.get(CounterKind::Frames), 0);
        assert_eq!(decoder.state(), SyncState::SyncSearch0);
    }

    #[test]
    fn test_lost_sync_counted_once() {
        let mut decoder = Decoder::new();
        let mut counters = CounterBank::new();
        run(&mut decoder, &mut counters, &wire(&Frame::new(1)));

        // Junk between frames
        run(&mut decoder, &mut counters, &[0x00, 0x01, 0x02, 0x03]);
        assert_eq!(counters.get(CounterKind::LostSyncs), 1);
        assert!(!decoder.is_synced());

        // Next frame re-establishes sync
        let frame = Frame::new(2);
        assert_eq!(run(&mut decoder, &mut counters, &wire(&frame)), Some(frame));
        assert_eq!(counters.get(CounterKind::GoodSyncs), 2);
        assert_eq!(counters.get(CounterKind::LostSyncs), 1);
    }

    #[test]
    fn test_broken_pattern_after_sync_keeps_searching() {
        let mut decoder = Decoder::new();
        let mut counters = CounterBank::new();
        run(&mut decoder, &mut counters, &wire(&Frame::new(1)));

        // 5A A5 then a bad third byte, then a clean frame
        run(&mut decoder, &mut counters, &[0x5A, 0xA5, 0x00]);
        assert_eq!(decoder.state(), SyncState::SyncSearch0);
        assert!(decoder.is_synced());

        let frame = Frame::new(2);
        assert_eq!(run(&mut decoder, &mut counters, &wire(&frame)), Some(frame));
        assert_eq!(counters.get(CounterKind::LostSyncs), 0);
        assert_eq!(counters.get(CounterKind::GoodSyncs), 2);
    }

    #[test]
    fn test_stale_payload_is_zeroed() {
        let mut noisy = Frame::new(1);
        noisy.points.iter_mut().for_each(|p| *p = Point::new(-1, -1, -1));
        noisy.seal();
        let mut corrupted = wire(&noisy);
        corrupted[FRAME_SIZE - 1] ^= 0xFF;

        let mut decoder = Decoder::new();
        let mut counters = CounterBank::new();
        assert!(run(&mut decoder, &mut counters, &corrupted).is_none());

        let clean = Frame::new(2);
        let decoded = run(&mut decoder, &mut counters, &wire(&clean)).unwrap();
        assert!(decoded.points.iter().all(|p| *p == Point::ORIGIN));
    }

    #[test]
    fn test_stream_sum_and_reset() {
        let mut decoder = Decoder::new();
        let mut counters = CounterBank::new();
        run(&mut decoder, &mut counters, &[1, 2, 3, 250]);
        assert_eq!(decoder.stream_sum(), 256);

        decoder.reset();
        assert_eq!(decoder.stream_sum(), 0);
        assert_eq!(decoder.state(), SyncState::NoSync);
    }
}
