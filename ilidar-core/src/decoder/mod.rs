//! Frame synchronization state machine
//!
//! The decoder consumes the sensor stream one byte at a time, hunts for the
//! sync pattern, then walks SIZE, SEQ, data and CHECKSUM. It only ever
//! yields frames whose size and checksum were both correct; everything else
//! is counted and the hunt starts over.

pub mod machine;
pub mod state;

pub use machine::Decoder;
pub use state::SyncState;
