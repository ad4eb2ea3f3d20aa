//! # Cross-platform OS signal handling.
//!
//! Process entry points drive a supervisor's context from termination signals:
//!
//! ```rust,no_run
//! # use appvisor::{Application, Config, Supervisor};
//! # use tokio_util::sync::CancellationToken;
//! # #[tokio::main]
//! # async fn main() -> Result<(), appvisor::AppError> {
//! let ctx = CancellationToken::new();
//! appvisor::cancel_on_shutdown_signal(ctx.clone());
//!
//! let sup = Supervisor::new(Config::default(), Vec::new());
//! sup.start(ctx)?.await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Signals
//! **Unix platforms:** `SIGINT` (Ctrl-C), `SIGTERM` (systemd/Kubernetes), `SIGQUIT`.
//!
//! **Windows platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`].

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::logging;

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
/// Returns `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Err` if signal registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Cancels `token` when a termination signal arrives.
///
/// The listener stops on its own once `token` is cancelled by someone else.
/// If signals cannot be registered the token is left alone and a warning goes
/// to the process-wide pipeline.
pub fn cancel_on_shutdown_signal(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            res = wait_for_shutdown_signal() => match res {
                Ok(()) => {
                    logging::info("shutdown signal received");
                    token.cancel();
                }
                Err(e) => logging::warn(format_args!("cannot listen for shutdown signals: {e}")),
            },
            _ = token.cancelled() => {}
        }
    })
}
