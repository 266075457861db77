//! Frame grabber core for Hybo iLidar sensors
//!
//! This crate turns the sensor's raw serial stream into validated frames:
//!
//! - Frame synchronization state machine (sync, size, checksum)
//! - Diagnostics counters with change flags
//! - Ping-pong frame queue between decoder and application
//! - Grabber configuration
//!
//! The transport sits behind [`ilidar_hal::ByteSource`]; the wire format
//! lives in [`ilidar_protocol`].

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod counters;
pub mod decoder;
pub mod grabber;
pub mod queue;

pub use config::{ConfigError, GrabberConfig};
pub use counters::{CounterBank, CounterKind};
pub use decoder::{Decoder, SyncState};
pub use grabber::{FrameGrabber, GrabReport};
pub use queue::{PingPong, PushOutcome, QUEUE_CAPACITY};

pub use ilidar_protocol::Frame;
