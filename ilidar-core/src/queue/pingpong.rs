//! Ownership-tagged double buffer
//!
//! Each slot carries a tag saying who owns it. The writer owns exactly one
//! [`SlotTag::Writable`] slot; the reader may own one [`SlotTag::Readable`]
//! slot. Ownership only moves in [`PingPong::try_swap`] (writer to reader)
//! and when the reader drains its slot (reader back to idle), both under
//! `&mut self`, so a frame being read can never be the one being written.

use ilidar_protocol::Frame;

use crate::counters::{CounterBank, CounterKind};

/// Frames per buffer
pub const QUEUE_CAPACITY: usize = 16;

/// Who owns a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotTag {
    /// Being filled by the decoder
    Writable,
    /// Full, handed to the consumer
    Readable,
    /// Drained, waiting to become the next writable slot
    Idle,
}

/// What happened to a pushed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PushOutcome {
    /// Stored; the writable buffer still has room
    Stored,
    /// Stored and the full buffer was handed to the consumer
    Swapped,
    /// Buffer full but the consumer still holds the other one; the whole
    /// batch is discarded and writing restarts at slot 0
    Overrun,
}

#[derive(Debug, Clone)]
struct Slot {
    tag: SlotTag,
    frames: [Frame; QUEUE_CAPACITY],
}

impl Slot {
    fn new(tag: SlotTag) -> Self {
        Self {
            tag,
            frames: core::array::from_fn(|_| Frame::default()),
        }
    }
}

/// Double-buffered frame queue
#[derive(Debug, Clone)]
pub struct PingPong {
    slots: [Slot; 2],
    /// Next free frame in the writable slot
    write_index: usize,
    /// Next unread frame in the readable slot
    read_index: usize,
}

impl Default for PingPong {
    fn default() -> Self {
        Self::new()
    }
}

impl PingPong {
    pub fn new() -> Self {
        Self {
            slots: [Slot::new(SlotTag::Writable), Slot::new(SlotTag::Idle)],
            write_index: 0,
            read_index: 0,
        }
    }

    /// Drop all buffered frames and hand slot 0 back to the writer
    pub fn reset(&mut self) {
        self.slots[0].tag = SlotTag::Writable;
        self.slots[1].tag = SlotTag::Idle;
        self.write_index = 0;
        self.read_index = 0;
    }

    /// Tags of both slots
    pub fn tags(&self) -> [SlotTag; 2] {
        [self.slots[0].tag, self.slots[1].tag]
    }

    /// Frames waiting in the writable buffer
    pub fn filling(&self) -> usize {
        self.write_index
    }

    /// Frames the consumer can read right now
    pub fn available(&self) -> usize {
        if self.readable().is_some() {
            QUEUE_CAPACITY - self.read_index
        } else {
            0
        }
    }

    /// Append a frame to the writable buffer
    pub fn push(&mut self, frame: Frame, counters: &mut CounterBank) -> PushOutcome {
        let writer = self.writable();
        self.slots[writer].frames[self.write_index] = frame;
        self.write_index += 1;
        if self.write_index < QUEUE_CAPACITY {
            return PushOutcome::Stored;
        }

        if self.try_swap() {
            #[cfg(feature = "defmt")]
            defmt::trace!("ping-pong swap, slot {} readable", writer);
            PushOutcome::Swapped
        } else {
            self.write_index = 0;
            counters.increment(CounterKind::WriteOverrun);
            #[cfg(feature = "defmt")]
            defmt::warn!("write overrun: consumer still holds the read buffer");
            PushOutcome::Overrun
        }
    }

    /// Hand the writable slot to the reader if it is full and the other
    /// slot is idle
    ///
    /// This is the only place ownership moves from writer to reader. A
    /// partly filled slot is never handed over.
    pub fn try_swap(&mut self) -> bool {
        if self.write_index < QUEUE_CAPACITY {
            return false;
        }
        let writer = self.writable();
        let other = 1 - writer;
        if self.slots[other].tag != SlotTag::Idle {
            return false;
        }
        self.slots[writer].tag = SlotTag::Readable;
        self.slots[other].tag = SlotTag::Writable;
        self.write_index = 0;
        self.read_index = 0;
        true
    }

    /// Take the next frame from the readable buffer
    ///
    /// Releases the buffer back to the writer once all of it has been read.
    pub fn read_next(&mut self, counters: &mut CounterBank) -> Option<&Frame> {
        let reader = self.readable()?;
        let index = self.read_index;
        counters.increment(CounterKind::FrameProcessed);

        self.read_index += 1;
        if self.read_index >= QUEUE_CAPACITY {
            self.slots[reader].tag = SlotTag::Idle;
            self.read_index = 0;
            counters.increment(CounterKind::BufferProcessed);
        }
        Some(&self.slots[reader].frames[index])
    }

    fn writable(&self) -> usize {
        if self.slots[0].tag == SlotTag::Writable {
            0
        } else {
            1
        }
    }

    fn readable(&self) -> Option<usize> {
        self.slots.iter().position(|slot| slot.tag == SlotTag::Readable)
    }
}
