//! Error types for nightcam-renderer.

use thiserror::Error;

/// All errors that can arise from document rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// The media path name cannot be used as a YAML key.
    #[error("invalid media path name '{0}'")]
    InvalidPathName(String),
}
