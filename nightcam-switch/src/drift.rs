//! Drift detection: does the file on disk match what the advertised mode renders to?
//!
//! Used at daemon startup (the advertised mode always starts at day, while the
//! file may hold a night document from a previous run) and by `nightcam status`.

use std::path::Path;

use nightcam_core::Mode;
use nightcam_renderer::ConfigRenderer;

use crate::error::{io_err, SwitchError};
use crate::writer::{read_optional_at, sha256_hex};

/// Classification of the on-disk config against the rendered document for a mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriftSignal {
    /// No config file exists.
    Missing,
    /// File content equals the rendered document byte for byte.
    Current,
    /// File differs; both digests are SHA-256 hex.
    Drifted { expected: String, actual: String },
}

impl DriftSignal {
    pub fn is_current(&self) -> bool {
        matches!(self, DriftSignal::Current)
    }
}

/// Compare `path` with the document `renderer` produces for `mode`.
pub fn check(renderer: &ConfigRenderer, mode: Mode, path: &Path) -> Result<DriftSignal, SwitchError> {
    let expected = renderer.render_mode(mode)?;
    let Some(actual) = read_optional_at(path).map_err(|e| io_err(path, e))? else {
        return Ok(DriftSignal::Missing);
    };

    if actual == expected.as_str() {
        return Ok(DriftSignal::Current);
    }
    Ok(DriftSignal::Drifted {
        expected: sha256_hex(expected.as_str()),
        actual: sha256_hex(&actual),
    })
}

/// Which mode's document the file currently holds, if it matches either exactly.
pub fn detect_mode(renderer: &ConfigRenderer, path: &Path) -> Result<Option<Mode>, SwitchError> {
    for mode in Mode::all() {
        if check(renderer, *mode, path)?.is_current() {
            return Ok(Some(*mode));
        }
    }
    Ok(None)
}
