//! Error types for nightcam-switch.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use nightcam_core::Mode;
use nightcam_renderer::RenderError;

/// Config file could not be backed up or replaced.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Copying the current file to its backup failed; nothing was written.
    #[error("failed to back up {path} to {backup}: {source}")]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the temp file, renaming it into place, or removing the target failed.
    #[error("failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistError {
    /// The underlying I/O condition (permission denied, not found, ...).
    pub fn kind(&self) -> std::io::ErrorKind {
        match self {
            PersistError::Backup { source, .. } | PersistError::Write { source, .. } => {
                source.kind()
            }
        }
    }
}

/// Service manager refused or failed to restart the unit.
#[derive(Debug, Error)]
pub enum RestartError {
    /// The supervision command could not be started at all.
    #[error("could not run `{program}`: {source}")]
    Dispatch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and reported failure.
    #[error("`{command}` failed ({status}): {output}")]
    Failed {
        command: String,
        status: String,
        output: String,
    },

    /// The command did not finish in time and was killed.
    #[error("`{command}` did not finish within {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },
}

/// State of the config file after a restart failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAfterFailure {
    /// New document left in place.
    Kept,
    /// Previous document restored.
    RolledBack,
    /// Restoring the previous document failed too.
    RollbackFailed(String),
}

impl fmt::Display for ConfigAfterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigAfterFailure::Kept => f.write_str("new config left on disk"),
            ConfigAfterFailure::RolledBack => f.write_str("previous config restored"),
            ConfigAfterFailure::RollbackFailed(e) => {
                write!(f, "restoring previous config failed: {e}")
            }
        }
    }
}

/// Why a mode transition was aborted. The advertised mode is unchanged in every case.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("failed to render config for {mode} mode: {source}")]
    Render {
        mode: Mode,
        #[source]
        source: RenderError,
    },

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("failed to restart {service}: {source} ({config})")]
    Restart {
        service: String,
        #[source]
        source: RestartError,
        config: ConfigAfterFailure,
    },
}

/// Errors from the read-only helpers (drift, diff) and orchestrator construction.
#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SwitchError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SwitchError {
    SwitchError::Io {
        path: path.into(),
        source,
    }
}
