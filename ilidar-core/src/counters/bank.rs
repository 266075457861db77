//! Counter bank implementation

use heapless::Vec;

/// Counted grabber events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CounterKind {
    /// Every byte pulled from the source
    Bytes,
    /// Frames that passed the checksum
    Frames,
    /// Complete sync patterns matched
    GoodSyncs,
    /// Sync lost after having been established
    LostSyncs,
    /// SIZE field did not match the fixed payload size
    SizeErrors,
    /// Checksum mismatch
    ChecksumErrors,
    /// Decoder reached an inconsistent state
    InvalidState,
    /// A full batch was discarded because the consumer had not drained the other buffer
    WriteOverrun,
    /// Read buffers fully drained by the consumer
    BufferProcessed,
    /// Frames handed to the consumer
    FrameProcessed,
}

impl CounterKind {
    /// Number of counter kinds
    pub const COUNT: usize = 10;

    /// All kinds, in dump order
    pub const ALL: [CounterKind; Self::COUNT] = [
        CounterKind::Bytes,
        CounterKind::Frames,
        CounterKind::GoodSyncs,
        CounterKind::LostSyncs,
        CounterKind::SizeErrors,
        CounterKind::ChecksumErrors,
        CounterKind::InvalidState,
        CounterKind::WriteOverrun,
        CounterKind::BufferProcessed,
        CounterKind::FrameProcessed,
    ];

    /// Stream-level error kinds
    ///
    /// Write overrun is not in this set: it is data loss on the consumer
    /// side, not noise on the link, and is watched separately.
    pub const ERRORS: [CounterKind; 4] = [
        CounterKind::LostSyncs,
        CounterKind::SizeErrors,
        CounterKind::ChecksumErrors,
        CounterKind::InvalidState,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable label used by the detailed dump
    pub fn description(self) -> &'static str {
        match self {
            CounterKind::Bytes => "Total bytes",
            CounterKind::Frames => "Good frames",
            CounterKind::GoodSyncs => "Good syncs",
            CounterKind::LostSyncs => "Lost syncs",
            CounterKind::SizeErrors => "Size errors",
            CounterKind::ChecksumErrors => "Cksum errors",
            CounterKind::InvalidState => "Invalid errors",
            CounterKind::WriteOverrun => "Write overrun",
            CounterKind::BufferProcessed => "Buffer processed",
            CounterKind::FrameProcessed => "Frame processed",
        }
    }

    /// Returns true if this kind is in [`CounterKind::ERRORS`]
    pub fn is_error(self) -> bool {
        Self::ERRORS.contains(&self)
    }
}

/// One counter: value plus "changed since last cleared" flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Counter {
    pub value: u32,
    pub changed: bool,
}

/// Counters for every [`CounterKind`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterBank {
    counters: [Counter; CounterKind::COUNT],
}

impl CounterBank {
    /// Create a bank with every counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter and clear every change flag
    pub fn reset(&mut self) {
        self.counters = [Counter::default(); CounterKind::COUNT];
    }

    /// Count one event
    ///
    /// Saturates rather than wrapping; a u32 outlasts any realistic session.
    pub fn increment(&mut self, kind: CounterKind) {
        let counter = &mut self.counters[kind.index()];
        counter.value = counter.value.saturating_add(1);
        counter.changed = true;
    }

    /// Current value of a counter
    pub fn get(&self, kind: CounterKind) -> u32 {
        self.counters[kind.index()].value
    }

    /// Value and change flag of a counter
    pub fn counter(&self, kind: CounterKind) -> Counter {
        self.counters[kind.index()]
    }

    pub fn has_changed(&self, kind: CounterKind) -> bool {
        self.counters[kind.index()].changed
    }

    /// Has any counter changed since the flags were last cleared?
    pub fn any_changed(&self) -> bool {
        self.counters.iter().any(|c| c.changed)
    }

    /// Has any error-class counter changed since the flags were last cleared?
    pub fn errors_changed(&self) -> bool {
        CounterKind::ERRORS.iter().any(|&kind| self.has_changed(kind))
    }

    /// Clear every change flag
    pub fn clear_changes(&mut self) {
        for counter in self.counters.iter_mut() {
            counter.changed = false;
        }
    }

    /// Clear the change flags of the error-class counters only
    pub fn clear_error_changes(&mut self) {
        self.clear_changes_for(&CounterKind::ERRORS);
    }

    /// Clear the change flags of the given kinds
    pub fn clear_changes_for(&mut self, kinds: &[CounterKind]) {
        for &kind in kinds {
            self.counters[kind.index()].changed = false;
        }
    }

    /// Kinds whose change flag is set, in dump order
    pub fn changed_kinds(&self) -> Vec<CounterKind, { CounterKind::COUNT }> {
        CounterKind::ALL
            .iter()
            .copied()
            .filter(|&kind| self.has_changed(kind))
            .collect()
    }

    /// Iterate over `(kind, value)` in dump order
    pub fn iter(&self) -> impl Iterator<Item = (CounterKind, u32)> + '_ {
        CounterKind::ALL.iter().map(move |&kind| (kind, self.get(kind)))
    }
}
