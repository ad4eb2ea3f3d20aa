//! # Application abstractions.
//!
//! This module provides:
//! - [`Application`] - trait every supervised unit implements
//! - [`AppRef`] - shared handle (`Arc<dyn Application>`)
//! - [`AppFn`] - closure-backed application
//! - [`HttpServer`] - axum listener with bounded graceful shutdown (feature `http`)

mod app_fn;
mod application;
#[cfg(feature = "http")]
mod http;

pub use app_fn::{AppFn, BoxAppFuture};
pub use application::{AppRef, Application};
pub(crate) use application::ensure_runtime;
#[cfg(feature = "http")]
pub use http::{HttpServer, SHUTDOWN_TIMEOUT};
#[cfg(feature = "prometheus")]
pub use http::{PROMETHEUS_PATH, prometheus_handle};
