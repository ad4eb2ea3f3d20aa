//! # Process-wide log pipeline.
//!
//! Optional singleton for code that cannot be handed a [`Logger`] explicitly.
//! The first [`init`] call creates the pipeline; later calls return the same
//! instance, whatever level or lifetime they pass. Concurrent first calls
//! resolve to exactly one writer.
//!
//! Before initialization the free functions ([`info`], [`error`], ...) are no-ops.

use std::fmt;
use std::sync::OnceLock;

use tokio_util::sync::CancellationToken;

use super::level::Level;
use super::pipeline::Logger;
use crate::config::Config;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Outcome of [`init`].
#[derive(Debug, Clone)]
pub enum Init {
    /// This call created the pipeline and is responsible for draining it.
    Created(Logger),
    /// The pipeline already existed; the passed configuration was ignored.
    Existing(Logger),
}

impl Init {
    /// The process-wide logger, regardless of who created it.
    pub fn logger(&self) -> &Logger {
        match self {
            Init::Created(l) | Init::Existing(l) => l,
        }
    }

    /// Returns `true` if this call created the pipeline.
    pub fn is_created(&self) -> bool {
        matches!(self, Init::Created(_))
    }
}

/// Initializes the process-wide pipeline (stdout sink) bound to `lifetime`.
///
/// Idempotent: only the first call has an effect.
///
/// # Panics
/// Panics if called outside a Tokio runtime (the writer task is spawned here).
pub fn init(lifetime: &CancellationToken, cfg: &Config) -> Init {
    init_in(&GLOBAL, || Logger::new(lifetime, cfg))
}

/// First caller to reach `cell` runs `make`; everyone gets the same logger.
fn init_in(cell: &OnceLock<Logger>, make: impl FnOnce() -> Logger) -> Init {
    let mut created = false;
    let logger = cell.get_or_init(|| {
        created = true;
        make()
    });
    if created {
        Init::Created(logger.clone())
    } else {
        Init::Existing(logger.clone())
    }
}

/// Returns the process-wide logger, if initialized.
pub fn global() -> Option<Logger> {
    GLOBAL.get().cloned()
}

/// Logs to the process-wide pipeline, if any.
pub fn log(level: Level, msg: impl fmt::Display) {
    if let Some(logger) = GLOBAL.get() {
        logger.log(level, msg);
    }
}

/// Logs at [`Level::Debug`] to the process-wide pipeline.
pub fn debug(msg: impl fmt::Display) {
    log(Level::Debug, msg);
}

/// Logs at [`Level::Info`] to the process-wide pipeline.
pub fn info(msg: impl fmt::Display) {
    log(Level::Info, msg);
}

/// Logs at [`Level::Warn`] to the process-wide pipeline.
pub fn warn(msg: impl fmt::Display) {
    log(Level::Warn, msg);
}

/// Logs at [`Level::Error`] to the process-wide pipeline.
pub fn error(msg: impl fmt::Display) {
    log(Level::Error, msg);
}

/// Sync signal of the process-wide pipeline.
///
/// Before initialization there is nothing to drain and the returned
/// completion has already fired.
pub fn sync() -> crate::Completion {
    GLOBAL
        .get()
        .map(Logger::sync)
        .unwrap_or_else(crate::Completion::ready)
}
