//! # Function-backed application (`AppFn`)
//!
//! [`AppFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`. Each
//! [`start`](Application::start) calls the closure once, spawns the returned
//! future and fires the completion when that future finishes.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use appvisor::{AppFn, AppRef};
//!
//! let worker: AppRef = AppFn::arc("worker", |ctx: CancellationToken| async move {
//!     ctx.cancelled().await;
//!     // cleanup...
//! });
//!
//! assert_eq!(worker.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use super::application::{Application, ensure_runtime};
use crate::completion::{Completion, completion};
use crate::error::AppError;

/// Boxed future produced by an [`AppFn`] closure.
pub type BoxAppFuture = BoxFuture<'static, ()>;

/// Function-backed application.
#[derive(Debug)]
pub struct AppFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> AppFn<F> {
    /// Creates a new function-backed application.
    ///
    /// Prefer [`AppFn::arc`] when you immediately need an [`AppRef`](crate::AppRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the application and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Application for AppFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, ctx: CancellationToken) -> Result<Completion, AppError> {
        ensure_runtime(&self.name)?;

        let fut: BoxAppFuture = Box::pin((self.f)(ctx));
        let (completer, done) = completion();
        tokio::spawn(async move {
            fut.await;
            completer.complete();
        });
        Ok(done)
    }
}
