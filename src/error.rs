//! Error types used by applications and the appvisor runtime.
//!
//! This module defines two enums:
//!
//! - [`AppError`]: an application could not be launched.
//! - [`ParseError`]: textual configuration (level, format) could not be parsed.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! Runtime failures of an already started application are **not** errors here:
//! they surface only as the eventual firing of its [`Completion`](crate::Completion).

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// # Errors produced when an application is started.
///
/// Returned by [`Application::start`](crate::Application::start) when the
/// background work could not even be launched. The supervisor logs these at
/// `Error` level and treats the application as already complete.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AppError {
    /// Generic launch failure (malformed configuration, missing resource, ...).
    #[error("{name}: launch failed: {reason}")]
    Launch {
        /// Application name.
        name: String,
        /// Human-readable cause.
        reason: String,
    },

    /// A listener could not be bound to its address.
    #[error("{name}: cannot bind {addr}: {source}")]
    Bind {
        /// Application name.
        name: String,
        /// Requested listen address.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// `start` was called outside of a Tokio runtime.
    #[error("{name}: no tokio runtime available")]
    NoRuntime {
        /// Application name.
        name: String,
    },
}

impl AppError {
    /// Convenience constructor for [`AppError::Launch`].
    pub fn launch(name: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Launch {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use appvisor::AppError;
    ///
    /// let err = AppError::launch("api", "missing port");
    /// assert_eq!(err.as_label(), "app_launch_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            AppError::Launch { .. } => "app_launch_failed",
            AppError::Bind { .. } => "app_bind_failed",
            AppError::NoRuntime { .. } => "app_no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            AppError::Launch { reason, .. } => format!("launch failed: {reason}"),
            AppError::Bind { addr, source, .. } => format!("bind {addr}: {source}"),
            AppError::NoRuntime { .. } => "no tokio runtime".to_string(),
        }
    }

    /// Name of the application that failed.
    pub fn app_name(&self) -> &str {
        match self {
            AppError::Launch { name, .. }
            | AppError::Bind { name, .. }
            | AppError::NoRuntime { name } => name,
        }
    }
}

/// # Errors produced while parsing textual configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown log level name.
    #[error("unknown log level {0:?} (expected debug, info, warn or error)")]
    Level(String),

    /// Unknown log format name.
    #[error("unknown log format {0:?} (expected plain or json)")]
    Format(String),
}

impl ParseError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ParseError::Level(_) => "parse_level",
            ParseError::Format(_) => "parse_format",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_error_carries_name() {
        let err = AppError::launch("metrics", "port missing");
        assert_eq!(err.app_name(), "metrics");
        assert_eq!(err.to_string(), "metrics: launch failed: port missing");
        assert_eq!(err.as_message(), "launch failed: port missing");
    }

    #[test]
    fn bind_error_exposes_source() {
        use std::error::Error as _;

        let err = AppError::Bind {
            name: "http".into(),
            addr: "127.0.0.1:80".parse().unwrap(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        assert_eq!(err.as_label(), "app_bind_failed");
        assert!(err.source().is_some());
        assert!(err.to_string().contains("127.0.0.1:80"));
    }

    #[test]
    fn parse_error_labels() {
        assert_eq!(ParseError::Level("x".into()).as_label(), "parse_level");
        assert_eq!(ParseError::Format("x".into()).as_label(), "parse_format");
    }
}
