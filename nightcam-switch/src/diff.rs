//! Preview of what a transition would write, as a unified diff.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use nightcam_core::Mode;
use nightcam_renderer::ConfigRenderer;

use crate::error::{io_err, SwitchError};
use crate::writer::read_optional_at;

/// Difference between the on-disk config and the document for a mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Render the document for `mode` and compare it with `path`.
///
/// Returns `None` when they are identical. A missing file diffs against empty
/// content. Nothing is written.
pub fn diff_against(
    renderer: &ConfigRenderer,
    mode: Mode,
    path: &Path,
) -> Result<Option<ConfigDiff>, SwitchError> {
    let rendered = renderer.render_mode(mode)?;
    let existing = read_optional_at(path)
        .map_err(|e| io_err(path, e))?
        .map(|s| s.replace("\r\n", "\n"))
        .unwrap_or_default();

    if existing == rendered.as_str() {
        return Ok(None);
    }

    let old_header = format!("a/{}", path.display());
    let new_header = format!("b/{} ({mode})", path.display());
    let unified = TextDiff::from_lines(existing.as_str(), rendered.as_str())
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();

    Ok(Some(ConfigDiff {
        path: path.to_path_buf(),
        unified_diff: unified,
    }))
}
