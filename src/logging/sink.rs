//! # Output sinks for the log writer.
//!
//! A [`Sink`] receives fully rendered lines from the single writer task, in
//! enqueue order. Two implementations ship with the crate:
//! - [`StdoutSink`]: writes to the process standard output (the default);
//! - [`MemorySink`]: keeps lines in memory, cloneable, for tests and embedding.

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

/// Destination of rendered log lines.
///
/// ### Implementation requirements
/// - Use async I/O; the writer runs on the async executor.
/// - Return errors instead of panicking; the writer ignores them.
#[async_trait]
pub trait Sink: Send + 'static {
    /// Writes one line. The line has no trailing newline.
    async fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Flushes buffered output. Called on explicit flushes and once at drain.
    async fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes lines to standard output.
pub struct StdoutSink {
    out: tokio::io::Stdout,
}

impl StdoutSink {
    /// Creates a sink over the process standard output.
    pub fn new() -> Self {
        Self {
            out: tokio::io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sink for StdoutSink {
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
        self.out.write_all(&buf).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.out.flush().await
    }
}

/// Collects lines in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns `true` if any written line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .any(|l| l.contains(needle))
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_sink_clones_share_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.write_line("one").await.unwrap();
        writer.write_line("two").await.unwrap();
        writer.flush().await.unwrap();

        assert_eq!(sink.lines(), vec!["one".to_string(), "two".to_string()]);
        assert!(sink.contains("tw"));
        assert!(!sink.contains("three"));
    }
}
