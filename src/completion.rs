//! # One-shot completion signal.
//!
//! [`completion`] returns a pair: a [`Completer`] owned by the background work and
//! a [`Completion`] handed to whoever wants to know when that work is over.
//!
//! ## Rules
//! - The signal fires **at most once**: [`Completer::complete`] consumes the completer.
//! - Dropping a completer fires the signal too, so a panicking task still completes.
//! - [`Completion`] is `Clone`: any number of waiters, before or after firing.
//! - Awaiting an already fired completion returns immediately.
//!
//! ## Example
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (completer, done) = appvisor::completion();
//! let waiter = done.clone();
//!
//! tokio::spawn(async move {
//!     // ... work ...
//!     completer.complete();
//! });
//!
//! waiter.await;
//! assert!(done.is_complete());
//! # }
//! ```

use std::fmt;
use std::future::IntoFuture;

use futures::future::BoxFuture;
use tokio::sync::watch;

/// Creates a connected completer/completion pair.
pub fn completion() -> (Completer, Completion) {
    let (tx, rx) = watch::channel(false);
    (Completer { tx }, Completion { rx })
}

/// Firing side of a completion signal.
pub struct Completer {
    tx: watch::Sender<bool>,
}

impl Completer {
    /// Fires the signal.
    pub fn complete(self) {
        drop(self);
    }
}

impl Drop for Completer {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

impl fmt::Debug for Completer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer").finish_non_exhaustive()
    }
}

/// Waiting side of a completion signal.
///
/// Await it directly (`done.await`) or through [`Completion::wait`].
#[derive(Clone)]
pub struct Completion {
    rx: watch::Receiver<bool>,
}

impl Completion {
    /// Returns a completion that has already fired.
    pub fn ready() -> Self {
        let (completer, done) = completion();
        completer.complete();
        done
    }

    /// Returns `true` once the signal has fired. Never blocks.
    pub fn is_complete(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits until the signal fires.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        // The sender always publishes `true` before it goes away.
        let _ = rx.wait_for(|done| *done).await;
    }
}

impl IntoFuture for Completion {
    type Output = ();
    type IntoFuture = BoxFuture<'static, ()>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.wait().await })
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("complete", &self.is_complete())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn fires_once_for_many_waiters() {
        let (completer, done) = completion();
        assert!(!done.is_complete());

        let waiters: Vec<_> = (0..4)
            .map(|_| tokio::spawn(done.clone().into_future()))
            .collect();

        completer.complete();
        for w in waiters {
            timeout(Duration::from_secs(1), w).await.unwrap().unwrap();
        }
        assert!(done.is_complete());
    }

    #[tokio::test]
    async fn late_waiter_does_not_block() {
        let done = Completion::ready();
        timeout(Duration::from_millis(100), done.wait())
            .await
            .expect("fired completion must resolve immediately");
        timeout(Duration::from_millis(100), done.clone())
            .await
            .expect("second await must resolve too");
    }

    #[tokio::test]
    async fn dropped_completer_fires() {
        let (completer, done) = completion();
        let handle = tokio::spawn(async move {
            let _completer = completer;
            panic!("work blew up");
        });
        assert!(handle.await.is_err());
        timeout(Duration::from_secs(1), done).await.unwrap();
    }
}
