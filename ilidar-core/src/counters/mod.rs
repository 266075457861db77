//! Grabber diagnostics counters
//!
//! Every event the grabber cares about bumps a named counter and marks it
//! changed. Change flags are only cleared by the consumer, so an
//! application that polls rarely can still ask "did anything go wrong
//! since I last looked?".

pub mod bank;
pub mod report;

pub use bank::{Counter, CounterBank, CounterKind};
pub use report::{DetailedReport, TerseReport};
