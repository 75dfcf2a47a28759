use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the control API runtime and unit generation.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("switch error: {0}")]
    Switch(#[from] nightcam_switch::SwitchError),

    #[error("server error: {0}")]
    Server(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
