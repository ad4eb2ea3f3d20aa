//! # Logging pipeline.
//!
//! This module provides:
//! - [`Logger`] - asynchronous single-writer pipeline with drain-on-shutdown
//! - [`Level`] / [`Format`] - severity filter and line format
//! - [`Entry`] - an immutable, fully rendered record
//! - [`Sink`] - where the writer puts lines ([`StdoutSink`], [`MemorySink`])
//! - [`init`] / [`global`] - optional process-wide instance and free functions

mod entry;
mod global;
mod level;
mod macros;
mod pipeline;
mod sink;

pub use entry::Entry;
pub use global::{Init, debug, error, global, info, init, log, sync, warn};
pub use level::{Format, Level};
pub use pipeline::Logger;
pub use sink::{MemorySink, Sink, StdoutSink};
