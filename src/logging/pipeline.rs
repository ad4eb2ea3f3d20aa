//! # Asynchronous log pipeline: many producers, one writer.
//!
//! [`Logger`] is a cheap-to-clone handle over a bounded queue drained by a single
//! background writer task. Log calls never perform I/O themselves.
//!
//! ## Architecture
//! ```text
//! logger.info(..) ──┐
//! logger.warn(..) ──┼──► [bounded queue] ──► writer task ──► Sink::write_line()
//! logger.error(..)──┘      (try_send)              │
//!                                                  └─► lifetime cancelled:
//!                                                        closed = true
//!                                                        close queue, drain it
//!                                                        sink.flush()
//!                                                        sync fires
//! ```
//!
//! ## Rules
//! - **Filter first**: entries below the minimum level never enter the queue.
//! - **Non-blocking**: a full queue drops the new entry and bumps [`Logger::dropped`].
//! - **FIFO**: lines are written in the order entries were enqueued.
//! - **Drain**: on cancellation every queued entry is written before [`Logger::sync`] fires.
//! - **Closed is final**: after draining, log calls are silently ignored.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::entry::Entry;
use super::level::{Format, Level};
use super::sink::{Sink, StdoutSink};
use crate::completion::{Completer, Completion, completion};
use crate::config::Config;

/// Queue item consumed by the writer.
enum Record {
    Entry(Entry),
    Flush(oneshot::Sender<()>),
}

/// State shared between handles and the writer.
struct Shared {
    level: Level,
    closed: AtomicBool,
    dropped: AtomicU64,
    sync: Completion,
    lifetime: CancellationToken,
}

/// Handle to a running log pipeline.
///
/// Clones share the same queue and writer. Safe to use from any number of
/// tasks or threads concurrently.
#[derive(Clone)]
pub struct Logger {
    tx: mpsc::Sender<Record>,
    shared: Arc<Shared>,
}

impl Logger {
    /// Starts a pipeline writing to standard output.
    ///
    /// The pipeline lives until `parent` is cancelled or [`Logger::shutdown`] is
    /// called; shutting it down never cancels `parent`.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime. [`Application::start`]
    /// implementations check for one first and return [`AppError::NoRuntime`].
    ///
    /// [`Application::start`]: crate::Application::start
    /// [`AppError::NoRuntime`]: crate::AppError::NoRuntime
    pub fn new(parent: &CancellationToken, cfg: &Config) -> Self {
        Self::with_sink(parent, cfg, StdoutSink::new())
    }

    /// Starts a pipeline writing to the given sink.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn with_sink<S: Sink>(parent: &CancellationToken, cfg: &Config, sink: S) -> Self {
        Self::with_boxed_sink(parent, cfg, Box::new(sink))
    }

    pub(crate) fn with_boxed_sink(
        parent: &CancellationToken,
        cfg: &Config,
        sink: Box<dyn Sink>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(cfg.queue_capacity_clamped());
        let (completer, sync) = completion();
        let shared = Arc::new(Shared {
            level: cfg.level,
            closed: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
            sync,
            lifetime: parent.child_token(),
        });

        let writer = Writer {
            rx,
            sink,
            format: cfg.format,
            shared: Arc::clone(&shared),
        };
        tokio::spawn(writer.run(completer));

        Self { tx, shared }
    }

    /// Submits a message at `level`.
    ///
    /// No-op if the pipeline is closed or `level` is below the minimum.
    /// The message is rendered here, on the caller's task.
    pub fn log(&self, level: Level, msg: impl fmt::Display) {
        if !self.enabled(level) {
            return;
        }
        let entry = Entry::now(level, msg.to_string());
        match self.tx.try_send(Record::Entry(entry)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }

    /// Returns `true` if an entry at `level` would currently be queued.
    pub fn enabled(&self, level: Level) -> bool {
        !self.is_closed() && level >= self.shared.level
    }

    /// Logs at [`Level::Debug`].
    pub fn debug(&self, msg: impl fmt::Display) {
        self.log(Level::Debug, msg);
    }

    /// Logs at [`Level::Info`].
    pub fn info(&self, msg: impl fmt::Display) {
        self.log(Level::Info, msg);
    }

    /// Logs at [`Level::Warn`].
    pub fn warn(&self, msg: impl fmt::Display) {
        self.log(Level::Warn, msg);
    }

    /// Logs at [`Level::Error`].
    pub fn error(&self, msg: impl fmt::Display) {
        self.log(Level::Error, msg);
    }

    /// Signal that fires once the pipeline has drained and stopped.
    ///
    /// May be awaited any number of times, before or after it fired.
    pub fn sync(&self) -> Completion {
        self.shared.sync.clone()
    }

    /// Waits until every entry submitted before this call has been written.
    ///
    /// Unlike [`Logger::sync`] this does not require the pipeline to stop. On a
    /// closed pipeline it waits for the drain to finish instead.
    pub async fn flush(&self) {
        if !self.is_closed() {
            let (ack, written) = oneshot::channel();
            if self.tx.send(Record::Flush(ack)).await.is_ok() && written.await.is_ok() {
                return;
            }
        }
        self.sync().await;
    }

    /// Requests a drain: the writer stops accepting entries, writes what is
    /// queued and then fires [`Logger::sync`].
    pub fn shutdown(&self) {
        self.shared.lifetime.cancel();
    }

    /// Returns `true` once the writer has started draining.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Number of entries dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// Minimum level of this pipeline.
    pub fn level(&self) -> Level {
        self.shared.level
    }

    /// Returns `true` if both handles point to the same pipeline.
    pub fn ptr_eq(a: &Logger, b: &Logger) -> bool {
        Arc::ptr_eq(&a.shared, &b.shared)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.shared.level)
            .field("closed", &self.is_closed())
            .field("dropped", &self.dropped())
            .finish()
    }
}

/// The single consumer of the queue.
struct Writer {
    rx: mpsc::Receiver<Record>,
    sink: Box<dyn Sink>,
    format: Format,
    shared: Arc<Shared>,
}

impl Writer {
    async fn run(mut self, completer: Completer) {
        let lifetime = self.shared.lifetime.clone();

        loop {
            let next = tokio::select! {
                biased;
                _ = lifetime.cancelled() => None,
                record = self.rx.recv() => record,
            };
            match next {
                Some(record) => self.handle(record).await,
                // Cancelled, or every handle is gone.
                None => break,
            }
        }

        self.shared.closed.store(true, Ordering::Release);
        self.rx.close();
        while let Some(record) = self.rx.recv().await {
            self.handle(record).await;
        }
        let _ = self.sink.flush().await;
        completer.complete();
    }

    async fn handle(&mut self, record: Record) {
        match record {
            Record::Entry(entry) => {
                let line = entry.render(self.format);
                let _ = self.sink.write_line(&line).await;
            }
            Record::Flush(ack) => {
                let _ = self.sink.flush().await;
                let _ = ack.send(());
            }
        }
    }
}
