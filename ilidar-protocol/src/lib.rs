//! iLidar Sensor Wire Protocol
//!
//! This crate defines the binary frame the iLidar sensor streams over its
//! serial link. The evaluation units only send the 3-D distance block, so the
//! payload has a single fixed shape:
//!
//! ```text
//! ┌──────────┬──────┬─────┬──────────┬──────────┬─────────┬───────────────┬──────────┐
//! │ SYNC     │ SIZE │ SEQ │ DATATYPE │ TIMEPEAK │ TIMEIMU │ POINTS        │ CHECKSUM │
//! │ 5A A5 5A │ 4B   │ 2B  │ 2B       │ 8B       │ 8B      │ 480 × 3 × i16 │ 4B       │
//! │ A5       │      │     │          │          │         │               │          │
//! └──────────┴──────┴─────┴──────────┴──────────┴─────────┴───────────────┴──────────┘
//! ```
//!
//! All integers are little-endian. SIZE counts SEQ through CHECKSUM. The
//! checksum is the wrapping 32-bit sum of every byte from SEQ through the
//! last point.

#![no_std]
#![deny(unsafe_code)]

pub mod datatype;
pub mod frame;

pub use datatype::{DataType, DistanceType, IntensityType};
pub use frame::{
    checksum, Frame, FrameError, Point, Timestamp, BODY_LEN, DATA_LEN, FRAME_SIZE, MAX_POINTS,
    PAYLOAD_SIZE, SYNC_PATTERN,
};
