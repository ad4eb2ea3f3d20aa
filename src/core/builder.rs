use std::borrow::Cow;
use std::sync::Arc;

use super::supervisor::{DEFAULT_NAME, LogTarget, SinkFactory, Supervisor};
use crate::apps::AppRef;
use crate::config::Config;
use crate::logging::{Logger, Sink};

/// Builder for a [`Supervisor`] with a custom name, applications and log target.
///
/// Without [`with_logger`](Self::with_logger) or [`with_sink`](Self::with_sink)
/// the supervisor uses the process-wide pipeline.
pub struct SupervisorBuilder {
    cfg: Config,
    name: Cow<'static, str>,
    apps: Vec<AppRef>,
    target: LogTarget,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            name: Cow::Borrowed(DEFAULT_NAME),
            apps: Vec::new(),
            target: LogTarget::Global,
        }
    }

    /// Sets the name used in log lines (default: `"supervisor"`).
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Appends one application.
    pub fn with_application(mut self, app: AppRef) -> Self {
        self.apps.push(app);
        self
    }

    /// Appends several applications, keeping their order.
    pub fn with_applications(mut self, apps: impl IntoIterator<Item = AppRef>) -> Self {
        self.apps.extend(apps);
        self
    }

    /// Logs into an existing pipeline.
    ///
    /// The supervisor only flushes it on completion; the owner decides when it closes.
    /// This is how nested supervisors and applications share one writer.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.target = LogTarget::Shared(logger);
        self
    }

    /// Logs into a private pipeline over `sink`, created on `start` and drained
    /// before the supervisor completes. Each start gets a clone of `sink`.
    pub fn with_sink<S: Sink + Clone + Sync>(mut self, sink: S) -> Self {
        let factory: SinkFactory = Arc::new(move || Box::new(sink.clone()) as Box<dyn Sink>);
        self.target = LogTarget::Private(factory);
        self
    }

    /// Builds the supervisor. Performs no I/O.
    pub fn build(self) -> Supervisor {
        Supervisor::new_internal(self.name, self.cfg, self.apps, self.target)
    }
}
