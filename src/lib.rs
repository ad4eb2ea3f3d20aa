//! # appvisor
//!
//! **Appvisor** is a minimal process-lifecycle supervisor for Rust.
//!
//! It starts a set of long-lived applications concurrently, forwards one shared
//! [`CancellationToken`](tokio_util::sync::CancellationToken) to all of them, and
//! completes once every application has terminated. State transitions are
//! reported through an asynchronous log pipeline that never stalls the caller on I/O
//! and drains fully before the supervisor reports completion.
//!
//! ## Architecture
//! ```text
//!       ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!       │ Application  │   │ Application  │   │  Supervisor  │ (nested)
//!       │  (AppFn)     │   │ (HttpServer) │   │  ...         │
//!       └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!              ▼                  ▼                  ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Supervisor::start(ctx)                                         │
//! │  - one task per application (JoinSet)                           │
//! │  - app.start(ctx) ─► Completion ─► await                        │
//! │  - join barrier ─► drain log pipeline ─► own Completion fires   │
//! └──────────────────────────────┬──────────────────────────────────┘
//!                                │ logger.info / logger.error (try_send)
//!                                ▼
//!                  ┌────────────────────────────┐
//!                  │ Logger: bounded queue      │
//!                  │   └─► single writer task   │──► Sink (stdout / memory)
//!                  └────────────────────────────┘
//! ```
//!
//! ## Features
//! | Area              | Description                                               | Key types                                |
//! |-------------------|-----------------------------------------------------------|------------------------------------------|
//! | **Applications**  | Uniform, non-blocking start contract with completion.     | [`Application`], [`AppFn`], [`AppRef`]   |
//! | **Supervision**   | Concurrent fan-out, fan-in of completions, nesting.       | [`Supervisor`], [`SupervisorBuilder`]    |
//! | **Completion**    | One-shot, multi-waiter signal.                            | [`Completion`], [`Completer`]            |
//! | **Logging**       | Asynchronous single-writer pipeline, drain on shutdown.   | [`Logger`], [`Level`], [`Sink`]          |
//! | **Errors**        | Typed launch and parse errors.                            | [`AppError`], [`ParseError`]             |
//! | **Configuration** | Log level, format and queue capacity.                     | [`Config`]                               |
//!
//! ## Optional features
//! - `http` _(default)_: [`HttpServer`], an axum listener with bounded graceful shutdown.
//! - `prometheus`: `HttpServer::prometheus(port)`, a Prometheus metrics endpoint.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use appvisor::{AppFn, AppRef, Application, Config, Level, MemorySink, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), appvisor::AppError> {
//!     let worker: AppRef = AppFn::arc("worker", |ctx: CancellationToken| async move {
//!         ctx.cancelled().await;
//!     });
//!
//!     let sink = MemorySink::new();
//!     let sup = Supervisor::builder(Config::with_level(Level::Info))
//!         .with_application(worker)
//!         .with_sink(sink.clone())
//!         .build();
//!
//!     let ctx = CancellationToken::new();
//!     let done = sup.start(ctx.clone())?;
//!
//!     tokio::time::sleep(Duration::from_millis(10)).await;
//!     ctx.cancel();
//!     done.await;
//!
//!     assert!(sink.contains("worker terminated gracefully"));
//!     Ok(())
//! }
//! ```

mod apps;
mod completion;
mod config;
mod core;
mod error;
pub mod logging;

// ---- Public re-exports ----

pub use apps::{AppFn, AppRef, Application, BoxAppFuture};
#[cfg(feature = "http")]
pub use apps::{HttpServer, SHUTDOWN_TIMEOUT};
#[cfg(feature = "prometheus")]
pub use apps::{PROMETHEUS_PATH, prometheus_handle};
pub use completion::{Completer, Completion, completion};
pub use config::{Config, DEFAULT_QUEUE_CAPACITY};
pub use core::{
    DEFAULT_NAME, Supervisor, SupervisorBuilder, cancel_on_shutdown_signal,
    wait_for_shutdown_signal,
};
pub use error::{AppError, ParseError};
pub use logging::{Entry, Format, Level, Logger, MemorySink, Sink, StdoutSink};
