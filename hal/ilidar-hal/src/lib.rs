//! iLidar Hardware Abstraction Layer
//!
//! This crate defines the seam between the frame grabber and whatever
//! transport actually carries the sensor's bytes (a USB serial adapter on a
//! host, a UART peripheral on a microcontroller, a replayed capture in tests).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ilidar-core (FrameGrabber)             │
//! └─────────────────────────────────────────┘
//!                     │  ByteSource
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ilidar-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ PollingSource │       │ IoSource      │
//! │ (InputQueue)  │       │ (embedded-io) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`source::ByteSource`] - Non-blocking "read what is queued" contract
//! - [`polling::InputQueue`] - Driver-level "bytes waiting" + non-blocking read

#![no_std]
#![deny(unsafe_code)]

pub mod io;
pub mod polling;
pub mod serial;
pub mod source;

// Re-export key traits at crate root for convenience
pub use io::IoSource;
pub use polling::{InputQueue, PollingSource};
pub use serial::SerialConfig;
pub use source::{ByteSource, ReadOutcome};
