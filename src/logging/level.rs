//! Log levels and output formats.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Severity of a log entry, totally ordered: `Debug < Info < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    /// Verbose diagnostics.
    Debug,
    /// Lifecycle transitions.
    #[default]
    Info,
    /// Something unexpected that did not stop the process.
    Warn,
    /// A failure, e.g. an application that could not be launched.
    Error,
}

impl Level {
    /// Upper-case name as written in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseError;

    /// Case-insensitive; `warning` is accepted as an alias of `warn`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(ParseError::Level(s.to_string())),
        }
    }
}

/// Line format produced by the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// `<RFC3339 timestamp> [<LEVEL>]: <message>`
    #[default]
    Plain,
    /// One JSON object per line: `{"timestamp":..,"level":..,"message":..}`
    Json,
}

impl FromStr for Format {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Format::Plain),
            "json" => Ok(Format::Json),
            _ => Err(ParseError::Format(s.to_string())),
        }
    }
}
