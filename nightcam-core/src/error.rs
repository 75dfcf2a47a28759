//! Error types for nightcam-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading [`crate::Settings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Underlying I/O failure (permission denied, unreadable file, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The settings file did not exist at an explicitly requested path.
    #[error("settings not found at {path}")]
    NotFound { path: PathBuf },

    /// A value parsed but is out of range.
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// A string that is neither `day` nor `night`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode '{0}'; expected: day, night")]
pub struct ParseModeError(pub String);
