//! Control API daemon: HTTP endpoints over the mode orchestrator.

pub mod api;
mod error;
mod runtime;
pub mod systemd;

pub use api::{router, ApiState};
pub use error::DaemonError;
pub use runtime::{init_tracing, run, serve, start_blocking};
pub use systemd::generate_unit;
