//! Formatted logging macros.
//!
//! Each macro takes a [`Logger`](crate::Logger) expression followed by
//! `format!`-style arguments:
//!
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use appvisor::{Config, Logger};
//! use tokio_util::sync::CancellationToken;
//!
//! let ctx = CancellationToken::new();
//! let logger = Logger::new(&ctx, &Config::default());
//! appvisor::info!(logger, "{} listening on port {}", "metrics", 9100);
//! # }
//! ```

/// Logs a formatted message at [`Level::Debug`](crate::Level::Debug).
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Logs a formatted message at [`Level::Info`](crate::Level::Info).
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Logs a formatted message at [`Level::Warn`](crate::Level::Warn).
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($arg)+)
    };
}

/// Logs a formatted message at [`Level::Error`](crate::Level::Error).
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Logs a formatted message at the given level.
///
/// Formatting is skipped entirely when the level is filtered out.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.enabled(level) {
            logger.log(level, format_args!($($arg)+));
        }
    }};
}
