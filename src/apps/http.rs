//! # HTTP server application.
//!
//! [`HttpServer`] serves an axum [`Router`] as a supervised [`Application`].
//!
//! ## Lifecycle
//! ```text
//! start(ctx)
//!   ├─► bind listener (failure → AppError::Bind, nothing spawned)
//!   ├─► spawn axum::serve(..).with_graceful_shutdown(ctx.cancelled())
//!   └─► spawn watcher:
//!         ├─ server exits on its own → log error (if any), complete
//!         └─ ctx cancelled → wait up to shutdown_timeout
//!               ├─ drained   → complete
//!               └─ exceeded  → hard stop, abort server, log error, complete
//! ```
//!
//! axum runs every connection in its own task, so aborting the serve task alone
//! would leave in-flight handlers running. Each router is wrapped in a layer that
//! drops the handler future on hard stop and answers `503 Service Unavailable`.

use std::borrow::Cow;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::application::{Application, ensure_runtime};
use crate::completion::{Completion, completion};
use crate::error::AppError;
use crate::logging::{self, Logger};

/// Upper bound for a graceful shutdown once the context is cancelled.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// An HTTP listener supervised as an application.
#[derive(Clone)]
pub struct HttpServer {
    name: Cow<'static, str>,
    addr: SocketAddr,
    router: Router,
    shutdown_timeout: Duration,
    logger: Option<Logger>,
}

impl HttpServer {
    /// Creates a server for `router` listening on `addr`.
    pub fn new(name: impl Into<Cow<'static, str>>, addr: SocketAddr, router: Router) -> Self {
        Self {
            name: name.into(),
            addr,
            router,
            shutdown_timeout: SHUTDOWN_TIMEOUT,
            logger: None,
        }
    }

    /// Overrides [`SHUTDOWN_TIMEOUT`].
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Reports server errors to `logger` instead of the process-wide pipeline.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Listen address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn bind(&self) -> Result<tokio::net::TcpListener, AppError> {
        let bind_err = |source| AppError::Bind {
            name: self.name.to_string(),
            addr: self.addr,
            source,
        };
        let listener = std::net::TcpListener::bind(self.addr).map_err(bind_err)?;
        listener.set_nonblocking(true).map_err(bind_err)?;
        tokio::net::TcpListener::from_std(listener).map_err(bind_err)
    }
}

impl Application for HttpServer {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, ctx: CancellationToken) -> Result<Completion, AppError> {
        ensure_runtime(&self.name)?;
        let listener = self.bind()?;

        let hard_stop = CancellationToken::new();
        let router = self.router.clone().layer(middleware::from_fn_with_state(
            hard_stop.clone(),
            abort_on_hard_stop,
        ));
        let stop = ctx.clone();
        let server: JoinHandle<std::io::Result<()>> = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(stop.cancelled_owned())
                .await
        });

        let (completer, done) = completion();
        let watcher = Watcher {
            name: self.name.to_string(),
            shutdown_timeout: self.shutdown_timeout,
            logger: self.logger.clone(),
            hard_stop,
        };
        tokio::spawn(async move {
            watcher.watch(server, ctx).await;
            completer.complete();
        });
        Ok(done)
    }
}

/// Races a request against the hard stop of its server.
async fn abort_on_hard_stop(
    State(hard_stop): State<CancellationToken>,
    req: Request,
    next: Next,
) -> Response {
    tokio::select! {
        res = next.run(req) => res,
        _ = hard_stop.cancelled() => {
            (StatusCode::SERVICE_UNAVAILABLE, "server shutting down").into_response()
        }
    }
}

/// Background half of a running [`HttpServer`].
struct Watcher {
    name: String,
    shutdown_timeout: Duration,
    logger: Option<Logger>,
    /// Cancelled when the graceful shutdown exceeds `shutdown_timeout`.
    hard_stop: CancellationToken,
}

impl Watcher {
    async fn watch(&self, mut server: JoinHandle<std::io::Result<()>>, ctx: CancellationToken) {
        let result = tokio::select! {
            res = &mut server => res,
            _ = ctx.cancelled() => {
                match tokio::time::timeout(self.shutdown_timeout, &mut server).await {
                    Ok(res) => res,
                    Err(_) => {
                        self.hard_stop.cancel();
                        server.abort();
                        self.report(format_args!(
                            "{} server shutdown exceeded {:?}",
                            self.name, self.shutdown_timeout
                        ));
                        return;
                    }
                }
            }
        };

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.report(format_args!("{} server error: {e}", self.name)),
            Err(e) => self.report(format_args!("{} server task failed: {e}", self.name)),
        }
    }

    fn report(&self, msg: std::fmt::Arguments<'_>) {
        match &self.logger {
            Some(logger) => logger.error(msg),
            None => logging::error(msg),
        }
    }
}

#[cfg(feature = "prometheus")]
mod prometheus {
    use std::net::{Ipv4Addr, SocketAddr};
    use std::sync::OnceLock;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

    use super::HttpServer;

    /// Path the metrics are served on.
    pub const PROMETHEUS_PATH: &str = "/prometheus";

    static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    /// Installs the process-wide Prometheus recorder on first use.
    ///
    /// Returns `None` if another metrics recorder was installed first.
    pub fn prometheus_handle() -> Option<PrometheusHandle> {
        HANDLE
            .get_or_init(|| PrometheusBuilder::new().install_recorder().ok())
            .clone()
    }

    async fn render_metrics() -> impl IntoResponse {
        match prometheus_handle() {
            Some(handle) => (
                StatusCode::OK,
                [("content-type", "text/plain; charset=utf-8")],
                handle.render(),
            ),
            None => (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain; charset=utf-8")],
                "metrics recorder not installed".to_string(),
            ),
        }
    }

    impl HttpServer {
        /// Prometheus exporter on `0.0.0.0:<port>`, serving [`PROMETHEUS_PATH`].
        pub fn prometheus(port: u16) -> Self {
            let _ = prometheus_handle();
            let router = Router::new().route(PROMETHEUS_PATH, get(render_metrics));
            HttpServer::new(
                "prometheus",
                SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
                router,
            )
        }
    }
}

#[cfg(feature = "prometheus")]
pub use prometheus::{PROMETHEUS_PATH, prometheus_handle};
