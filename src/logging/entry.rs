//! Immutable log entry and its line rendering.

use chrono::{DateTime, SecondsFormat, Utc};

use super::level::{Format, Level};

/// A single log record.
///
/// The message is fully rendered and the timestamp captured when the entry is
/// submitted, not when the writer gets to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Severity.
    pub level: Level,
    /// Submission time (UTC).
    pub timestamp: DateTime<Utc>,
    /// Rendered message.
    pub message: String,
}

impl Entry {
    /// Creates an entry stamped with the current UTC time.
    pub fn now(level: Level, message: String) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            message,
        }
    }

    /// Renders the entry as a single line (without trailing newline).
    pub fn render(&self, format: Format) -> String {
        let ts = self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
        match format {
            Format::Plain => format!("{ts} [{}]: {}", self.level, self.message),
            Format::Json => serde_json::json!({
                "timestamp": ts,
                "level": self.level.as_str(),
                "message": self.message,
            })
            .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed(level: Level, msg: &str) -> Entry {
        Entry {
            level,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap(),
            message: msg.to_string(),
        }
    }

    #[test]
    fn plain_line() {
        let line = fixed(Level::Warn, "disk almost full").render(Format::Plain);
        assert_eq!(line, "2024-05-01T12:30:45Z [WARN]: disk almost full");
    }

    #[test]
    fn json_line_escapes_message() {
        let line = fixed(Level::Error, "bad \"quote\"").render(Format::Json);
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["timestamp"], "2024-05-01T12:30:45Z");
        assert_eq!(v["level"], "ERROR");
        assert_eq!(v["message"], "bad \"quote\"");
    }
}
