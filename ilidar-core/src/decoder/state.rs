//! Decoder states

/// Decoder states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncState {
    /// Recovering from a failure; counts a lost sync if one was ever held
    #[default]
    NoSync,
    /// Waiting for sync byte 0
    SyncSearch0,
    /// Matched sync byte 0
    SyncSearch1,
    /// Matched sync bytes 0-1
    SyncSearch2,
    /// Matched sync bytes 0-2
    SyncSearch3,
    /// Reading the 4-byte SIZE field
    GetSize,
    /// Reading the 2-byte sequence number
    GetSeq,
    /// Reading datatype, timestamps and points
    GetData,
    /// Reading the 4-byte checksum
    GetChecksum,
}

impl SyncState {
    /// Returns true while hunting for the sync pattern
    pub fn is_searching(&self) -> bool {
        matches!(
            self,
            SyncState::NoSync
                | SyncState::SyncSearch0
                | SyncState::SyncSearch1
                | SyncState::SyncSearch2
                | SyncState::SyncSearch3
        )
    }

    /// Returns true while reading the fields of a frame
    pub fn is_in_frame(&self) -> bool {
        !self.is_searching()
    }

    /// Number of sync bytes matched so far, for the search states
    pub fn sync_matched(&self) -> Option<usize> {
        match self {
            SyncState::NoSync | SyncState::SyncSearch0 => Some(0),
            SyncState::SyncSearch1 => Some(1),
            SyncState::SyncSearch2 => Some(2),
            SyncState::SyncSearch3 => Some(3),
            _ => None,
        }
    }
}
