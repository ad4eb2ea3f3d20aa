//! # Supervisor: fans out application starts, fans in their completions.
//!
//! The [`Supervisor`] owns a list of [`AppRef`]s and a [`Config`]. It is itself an
//! [`Application`], so supervisors nest.
//!
//! ## High-level architecture
//! ```text
//! start(ctx):
//!   resolve log pipeline (shared / private / process-wide)
//!   log "<name> started"
//!   spawn run ─────────────────────────────────────────────► return Completion
//!
//! run:
//!   app[0]   app[1]   ...   app[N-1]              (one task each, JoinSet)
//!     │        │                │
//!     └──► log "<app> started"
//!          app.start(ctx.clone())
//!            ├─ Err / panic ─► log error, treat as complete
//!            └─ Ok(done)    ─► done.await, log "<app> terminated gracefully"
//!
//!   join barrier (all per-app tasks finished)
//!   log "<name> terminated gracefully"
//!   owned pipeline  ─► shutdown() + sync().await
//!   shared pipeline ─► flush().await
//!   fire Completion
//! ```
//!
//! ## Rules
//! - Starts are concurrent; a slow or failing application never delays a sibling.
//! - Launch failures are absorbed: logged at `Error`, never returned to the caller.
//! - The same `ctx` is forwarded to every application; the supervisor adds no timeout.
//! - The supervisor completes only after every application completed (or failed to start),
//!   even if `ctx` was already cancelled when `start` was called.

use std::any::Any;
use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::builder::SupervisorBuilder;
use crate::apps::{AppRef, Application, ensure_runtime};
use crate::completion::{Completion, completion};
use crate::config::Config;
use crate::error::AppError;
use crate::logging::{self, Init, Logger, Sink};

/// Default supervisor name, as it appears in log lines.
pub const DEFAULT_NAME: &str = "supervisor";

/// Builds a fresh sink for a private pipeline.
pub(crate) type SinkFactory = Arc<dyn Fn() -> Box<dyn Sink> + Send + Sync>;

/// Where a supervisor sends its log lines.
#[derive(Clone)]
pub(crate) enum LogTarget {
    /// Process-wide pipeline; drained by whichever supervisor created it.
    Global,
    /// Caller-owned pipeline; only flushed.
    Shared(Logger),
    /// Pipeline created per `start` over a fresh sink; drained on completion.
    Private(SinkFactory),
}

/// Starts a set of applications concurrently and completes once all of them have.
pub struct Supervisor {
    name: Cow<'static, str>,
    cfg: Config,
    apps: Vec<AppRef>,
    target: LogTarget,
}

impl Supervisor {
    /// Creates a supervisor logging to the process-wide pipeline.
    ///
    /// Performs no I/O and cannot fail.
    pub fn new(cfg: Config, apps: Vec<AppRef>) -> Self {
        Self::new_internal(Cow::Borrowed(DEFAULT_NAME), cfg, apps, LogTarget::Global)
    }

    /// Returns a builder for a supervisor with a custom name or log target.
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        name: Cow<'static, str>,
        cfg: Config,
        apps: Vec<AppRef>,
        target: LogTarget,
    ) -> Self {
        Self {
            name,
            cfg,
            apps,
            target,
        }
    }

    /// Supervised applications, in insertion order.
    pub fn applications(&self) -> &[AppRef] {
        &self.apps
    }

    /// Configuration used for pipelines this supervisor creates.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Resolves the pipeline for one run and whether this run must drain it.
    ///
    /// Owned pipelines get their own root token: cancelling `ctx` reaches them
    /// through the join barrier, so lines logged while applications wind down
    /// are kept.
    fn pipeline(&self) -> (Logger, bool) {
        match &self.target {
            LogTarget::Shared(logger) => (logger.clone(), false),
            LogTarget::Private(make_sink) => {
                let logger =
                    Logger::with_boxed_sink(&CancellationToken::new(), &self.cfg, make_sink());
                (logger, true)
            }
            LogTarget::Global => match logging::init(&CancellationToken::new(), &self.cfg) {
                Init::Created(logger) => (logger, true),
                Init::Existing(logger) => (logger, false),
            },
        }
    }
}

impl Application for Supervisor {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, ctx: CancellationToken) -> Result<Completion, AppError> {
        ensure_runtime(&self.name)?;

        let (logger, owned) = self.pipeline();
        crate::info!(logger, "{} started", self.name);

        let run = Run {
            name: self.name.to_string(),
            apps: self.apps.clone(),
            logger,
            owned,
        };
        let (completer, done) = completion();
        tokio::spawn(async move {
            run.drive(ctx).await;
            completer.complete();
        });
        Ok(done)
    }
}

/// State of one supervisor run, moved into its background task.
struct Run {
    name: String,
    apps: Vec<AppRef>,
    logger: Logger,
    owned: bool,
}

impl Run {
    async fn drive(self, ctx: CancellationToken) {
        let mut set = JoinSet::new();
        for app in &self.apps {
            set.spawn(supervise(Arc::clone(app), ctx.clone(), self.logger.clone()));
        }

        while let Some(res) = set.join_next().await {
            if let Err(e) = res {
                crate::error!(self.logger, "{}: supervising task failed: {e}", self.name);
            }
        }

        crate::info!(self.logger, "{} terminated gracefully", self.name);
        if self.owned {
            self.logger.shutdown();
            self.logger.sync().await;
        } else {
            self.logger.flush().await;
        }
    }
}

/// Starts one application and waits for it to terminate.
async fn supervise(app: AppRef, ctx: CancellationToken, logger: Logger) {
    let name = app.name().to_string();
    crate::info!(logger, "{name} started");

    match panic::catch_unwind(AssertUnwindSafe(|| app.start(ctx))) {
        Ok(Ok(done)) => {
            done.await;
            crate::info!(logger, "{name} terminated gracefully");
        }
        Ok(Err(e)) => {
            crate::error!(logger, "{name} failed to start: {}", e.as_message());
        }
        Err(panic) => {
            crate::error!(
                logger,
                "{name} failed to start: panicked: {}",
                panic_message(&*panic)
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::AppFn;
    use crate::logging::{Level, MemorySink};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    struct FailingApp;

    impl Application for FailingApp {
        fn name(&self) -> &str {
            "broken"
        }

        fn start(&self, _ctx: CancellationToken) -> Result<Completion, AppError> {
            Err(AppError::launch("broken", "bad configuration"))
        }
    }

    struct PanickingApp;

    impl Application for PanickingApp {
        fn name(&self) -> &str {
            "panicky"
        }

        fn start(&self, _ctx: CancellationToken) -> Result<Completion, AppError> {
            panic!("start exploded")
        }
    }

    fn after(name: &'static str, delay: Duration) -> AppRef {
        AppFn::arc(name, move |_ctx: CancellationToken| async move {
            sleep(delay).await;
        })
    }

    fn until_cancelled(name: &'static str) -> AppRef {
        AppFn::arc(name, |ctx: CancellationToken| async move {
            ctx.cancelled().await;
        })
    }

    fn supervised(apps: Vec<AppRef>, sink: &MemorySink) -> Supervisor {
        Supervisor::builder(Config::with_level(Level::Debug))
            .with_applications(apps)
            .with_sink(sink.clone())
            .build()
    }

    fn position(lines: &[String], needle: &str) -> usize {
        lines
            .iter()
            .position(|l| l.ends_with(needle))
            .unwrap_or_else(|| panic!("missing line {needle:?} in {lines:#?}"))
    }

    #[tokio::test]
    async fn zero_applications_complete_promptly() {
        let sink = MemorySink::new();
        let sup = supervised(Vec::new(), &sink);

        let done = sup.start(CancellationToken::new()).unwrap();
        timeout(Duration::from_millis(500), done).await.unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 2, "{lines:#?}");
        assert!(lines[0].ends_with("[INFO]: supervisor started"));
        assert!(lines[1].ends_with("[INFO]: supervisor terminated gracefully"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn two_stubs_within_deadline() {
        let sink = MemorySink::new();
        let sup = supervised(
            vec![
                after("A", Duration::from_millis(10)),
                after("B", Duration::ZERO),
            ],
            &sink,
        );

        let ctx = CancellationToken::new();
        let deadline = ctx.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(2)).await;
            deadline.cancel();
        });

        let done = sup.start(ctx).unwrap();
        timeout(Duration::from_secs(2), done)
            .await
            .expect("supervisor must complete before the deadline");

        let lines = sink.lines();
        let a_started = position(&lines, "A started");
        let b_started = position(&lines, "B started");
        let a_done = position(&lines, "A terminated gracefully");
        let b_done = position(&lines, "B terminated gracefully");
        assert!(a_started < a_done);
        assert!(b_started < b_done);
        assert_eq!(position(&lines, "supervisor started"), 0);
        assert_eq!(
            position(&lines, "supervisor terminated gracefully"),
            lines.len() - 1
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn completes_only_after_every_application() {
        let sink = MemorySink::new();
        let finished = Arc::new(AtomicUsize::new(0));

        let apps: Vec<AppRef> = (0..10u64)
            .map(|i| {
                let finished = Arc::clone(&finished);
                let app: AppRef = AppFn::arc(format!("app-{i}"), move |ctx: CancellationToken| {
                    let finished = Arc::clone(&finished);
                    async move {
                        ctx.cancelled().await;
                        sleep(Duration::from_millis(5 * i)).await;
                        finished.fetch_add(1, Ordering::SeqCst);
                    }
                });
                app
            })
            .collect();

        let sup = supervised(apps, &sink);
        let ctx = CancellationToken::new();
        let done = sup.start(ctx.clone()).unwrap();

        sleep(Duration::from_millis(50)).await;
        assert!(!done.is_complete());

        ctx.cancel();
        timeout(Duration::from_secs(2), done).await.unwrap();
        assert_eq!(finished.load(Ordering::SeqCst), 10);

        for i in 0..10 {
            assert!(sink.contains(&format!("app-{i} terminated gracefully")));
        }
    }

    #[tokio::test]
    async fn single_application_gates_completion() {
        let sink = MemorySink::new();
        let sup = supervised(vec![until_cancelled("only")], &sink);

        let ctx = CancellationToken::new();
        let done = sup.start(ctx.clone()).unwrap();

        sleep(Duration::from_millis(30)).await;
        assert!(!done.is_complete());

        ctx.cancel();
        timeout(Duration::from_secs(1), done).await.unwrap();
        assert!(sink.contains("only terminated gracefully"));
    }

    #[tokio::test]
    async fn launch_failure_is_absorbed() {
        let sink = MemorySink::new();
        let sup = supervised(
            vec![Arc::new(FailingApp) as AppRef, after("healthy", Duration::from_millis(5))],
            &sink,
        );

        let done = sup.start(CancellationToken::new()).unwrap();
        timeout(Duration::from_secs(1), done).await.unwrap();

        assert!(sink.contains("[ERROR]: broken failed to start: launch failed: bad configuration"));
        assert!(!sink.contains("broken terminated gracefully"));
        assert!(sink.contains("healthy terminated gracefully"));
        assert!(sink.contains("supervisor terminated gracefully"));
    }

    #[tokio::test]
    async fn panicking_start_is_absorbed() {
        let sink = MemorySink::new();
        let sup = supervised(vec![Arc::new(PanickingApp) as AppRef], &sink);

        let done = sup.start(CancellationToken::new()).unwrap();
        timeout(Duration::from_secs(1), done).await.unwrap();

        assert!(sink.contains("[ERROR]: panicky failed to start: panicked: start exploded"));
        assert!(sink.contains("supervisor terminated gracefully"));
    }

    #[tokio::test]
    async fn cancelled_context_still_waits_for_children() {
        let sink = MemorySink::new();
        let slow_exit: AppRef = AppFn::arc("slow-exit", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            sleep(Duration::from_millis(50)).await;
        });
        let sup = supervised(vec![slow_exit], &sink);

        let ctx = CancellationToken::new();
        ctx.cancel();
        let done = sup.start(ctx).unwrap();

        sleep(Duration::from_millis(10)).await;
        assert!(!done.is_complete());

        timeout(Duration::from_secs(1), done).await.unwrap();
        assert!(sink.contains("slow-exit terminated gracefully"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn owned_pipeline_outlives_context_until_barrier() {
        let sink = MemorySink::new();
        let winding_down: AppRef = AppFn::arc("winding-down", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            sleep(Duration::from_millis(150)).await;
        });
        let sup = supervised(vec![winding_down], &sink);

        let ctx = CancellationToken::new();
        let done = sup.start(ctx.clone()).unwrap();
        sleep(Duration::from_millis(20)).await;
        ctx.cancel();

        sleep(Duration::from_millis(50)).await;
        assert!(!done.is_complete());
        assert!(!sink.contains("supervisor terminated gracefully"));

        timeout(Duration::from_secs(1), done).await.unwrap();
        let lines = sink.lines();
        let child_done = position(&lines, "winding-down terminated gracefully");
        let sup_done = position(&lines, "supervisor terminated gracefully");
        assert!(child_done < sup_done);
        assert_eq!(sup_done, lines.len() - 1);
    }

    #[tokio::test]
    async fn level_filter_applies_to_supervisor_lines() {
        let sink = MemorySink::new();
        let sup = Supervisor::builder(Config::with_level(Level::Warn))
            .with_application(Arc::new(FailingApp))
            .with_application(after("fine", Duration::ZERO))
            .with_sink(sink.clone())
            .build();

        let done = sup.start(CancellationToken::new()).unwrap();
        timeout(Duration::from_secs(1), done).await.unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 1, "{lines:#?}");
        assert!(lines[0].contains("[ERROR]: broken failed to start"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn nested_supervisors_share_a_pipeline() {
        let sink = MemorySink::new();
        let log_ctx = CancellationToken::new();
        let logger = Logger::with_sink(&log_ctx, &Config::with_level(Level::Info), sink.clone());

        let inner: AppRef = Arc::new(
            Supervisor::builder(Config::default())
                .with_name("inner")
                .with_application(after("leaf", Duration::from_millis(5)))
                .with_logger(logger.clone())
                .build(),
        );
        let outer = Supervisor::builder(Config::default())
            .with_name("outer")
            .with_application(inner)
            .with_application(after("sibling", Duration::ZERO))
            .with_logger(logger.clone())
            .build();

        let done = outer.start(CancellationToken::new()).unwrap();
        timeout(Duration::from_secs(1), done).await.unwrap();

        // A shared pipeline is flushed, not closed.
        assert!(!logger.is_closed());

        let lines = sink.lines();
        let leaf_done = position(&lines, "leaf terminated gracefully");
        let inner_done = position(&lines, "inner terminated gracefully");
        let outer_done = position(&lines, "outer terminated gracefully");
        assert!(leaf_done < inner_done);
        assert!(inner_done < outer_done);
        assert_eq!(outer_done, lines.len() - 1);

        log_ctx.cancel();
        timeout(Duration::from_secs(1), logger.sync()).await.unwrap();
    }

    #[test]
    fn start_outside_runtime_is_a_launch_error() {
        let sup = Supervisor::builder(Config::default())
            .with_sink(MemorySink::new())
            .build();
        let err = sup.start(CancellationToken::new()).unwrap_err();
        assert!(matches!(err, AppError::NoRuntime { .. }));
    }

    #[test]
    fn construction_keeps_order_and_config() {
        let sup = Supervisor::new(
            Config::with_level(Level::Error),
            vec![after("first", Duration::ZERO), after("second", Duration::ZERO)],
        );
        let names: Vec<_> = sup.applications().iter().map(|a| a.name()).collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(sup.config().level, Level::Error);
        assert_eq!(sup.name(), DEFAULT_NAME);
    }
}
