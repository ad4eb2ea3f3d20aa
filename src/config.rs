//! # Runtime configuration.
//!
//! Provides [`Config`], the settings a [`Supervisor`](crate::Supervisor) uses to
//! set up its log pipeline.
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → clamped to 1 (a zero-capacity channel cannot be built)

use crate::logging::{Format, Level};

/// Default capacity of the log pipeline queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Configuration for a supervisor and the log pipeline it initializes.
///
/// ## Field semantics
/// - `level`: entries below this level are discarded before they are queued
/// - `format`: how the writer renders entries (plain text or JSON lines)
/// - `queue_capacity`: bounded queue between producers and the writer (`0` → 1)
///
/// ## Notes
/// All fields are public. Prefer [`Config::queue_capacity_clamped`] over reading
/// `queue_capacity` directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Minimum level that reaches the sink.
    pub level: Level,

    /// Line format used by the writer.
    pub format: Format,

    /// Capacity of the pending-entry queue.
    ///
    /// When the queue is full new entries are dropped (and counted), producers
    /// never block.
    pub queue_capacity: usize,
}

impl Config {
    /// Creates a default configuration with the given minimum level.
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `level = Level::Info`
    /// - `format = Format::Plain`
    /// - `queue_capacity = 1024`
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: Format::Plain,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
