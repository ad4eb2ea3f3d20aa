//! # Application contract.
//!
//! An [`Application`] is a long-lived unit with a stable [`name`](Application::name)
//! and a non-blocking [`start`](Application::start) that receives the shared
//! [`CancellationToken`] and hands back a [`Completion`].
//!
//! ## Rules
//! - `start` returns **immediately**; the real work runs in the background.
//! - `start` fails only when the work could not be launched at all. Later
//!   failures surface as the completion firing.
//! - The completion fires exactly once, when the application has terminated.
//! - An application is started at most once.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::completion::Completion;
use crate::error::AppError;

/// Shared handle to an application.
pub type AppRef = Arc<dyn Application>;

/// # Long-lived supervised unit.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use appvisor::{AppError, Application, Completion, completion};
///
/// struct Ticker;
///
/// impl Application for Ticker {
///     fn name(&self) -> &str { "ticker" }
///
///     fn start(&self, ctx: CancellationToken) -> Result<Completion, AppError> {
///         let (completer, done) = completion();
///         tokio::spawn(async move {
///             ctx.cancelled().await;
///             completer.complete();
///         });
///         Ok(done)
///     }
/// }
/// ```
pub trait Application: Send + Sync + 'static {
    /// Returns a human-readable name used in log lines.
    fn name(&self) -> &str;

    /// Launches the application in the background.
    ///
    /// Implementations must watch `ctx` and terminate promptly once it is cancelled.
    fn start(&self, ctx: CancellationToken) -> Result<Completion, AppError>;
}

/// Returns [`AppError::NoRuntime`] unless called from within a Tokio runtime.
pub(crate) fn ensure_runtime(name: &str) -> Result<(), AppError> {
    tokio::runtime::Handle::try_current()
        .map(|_| ())
        .map_err(|_| AppError::NoRuntime {
            name: name.to_string(),
        })
}
