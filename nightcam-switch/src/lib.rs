//! # nightcam-switch
//!
//! Mode transitions for the streaming service: persist the rendered config
//! with a backup, restart the service, and only then advertise the new mode.
//!
//! Build an [`Orchestrator`] from [`nightcam_core::Settings`] and a
//! [`ServiceController`] (normally [`Systemctl`]), then call
//! [`Orchestrator::set_mode`]. [`drift`] and [`diff`] are read-only helpers
//! that compare the file on disk with a rendered document.

pub mod diff;
pub mod drift;
pub mod error;
pub mod orchestrator;
pub mod service;
pub mod writer;

pub use diff::{diff_against, ConfigDiff};
pub use drift::DriftSignal;
pub use error::{ConfigAfterFailure, PersistError, RestartError, SwitchError, TransitionError};
pub use orchestrator::{Orchestrator, Transition};
pub use service::{ServiceController, Systemctl};
pub use writer::{ConfigStore, WriteReport};
