//! Runtime core: supervision and shutdown.
//!
//! Internal modules:
//! - [`supervisor`]: fans out application starts and fans in completions;
//! - [`builder`]: name, applications and log target of a supervisor;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use shutdown::{cancel_on_shutdown_signal, wait_for_shutdown_signal};
pub use supervisor::{DEFAULT_NAME, Supervisor};
