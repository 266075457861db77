//! Ping-pong frame queue
//!
//! Two fixed-capacity frame buffers. The decoder fills one while the
//! consumer drains the other; roles swap when the writer's buffer is full
//! and the reader's buffer has been released.

pub mod pingpong;

pub use pingpong::{PingPong, PushOutcome, SlotTag, QUEUE_CAPACITY};
