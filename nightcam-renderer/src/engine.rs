//! Tera rendering engine: [`ConfigRenderer`] and [`ConfigDocument`].

use std::fmt;

use tera::Tera;

use nightcam_core::{presets, Mode, Preset};

use crate::context::DocumentContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded template: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TEMPLATE_NAME: &str = "mediamtx.yml.tera";
const TEMPLATE: &str = include_str!("templates/mediamtx.yml.tera");

// ---------------------------------------------------------------------------
// ConfigDocument
// ---------------------------------------------------------------------------

/// Rendered configuration text. Two documents are equal iff their bytes are.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigDocument(String);

impl ConfigDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ConfigDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// ConfigRenderer
// ---------------------------------------------------------------------------

/// Renders the streaming-service document for a mode.
///
/// Create once with [`ConfigRenderer::new`] and reuse; rendering never touches
/// the filesystem.
pub struct ConfigRenderer {
    tera: Tera,
    path_name: String,
}

impl ConfigRenderer {
    /// Construct a renderer whose single media path is named `path_name`.
    pub fn new(path_name: impl Into<String>) -> Result<Self, RenderError> {
        let path_name = path_name.into();
        if path_name.is_empty()
            || !path_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
        {
            return Err(RenderError::InvalidPathName(path_name));
        }

        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(ConfigRenderer { tera, path_name })
    }

    pub fn path_name(&self) -> &str {
        &self.path_name
    }

    /// Render the document for `mode` using the supplied `preset`.
    pub fn render(&self, mode: Mode, preset: &Preset) -> Result<ConfigDocument, RenderError> {
        let ctx = DocumentContext::new(mode, preset, &self.path_name);
        let text = self.tera.render(TEMPLATE_NAME, &ctx.to_tera_context()?)?;
        Ok(ConfigDocument(text))
    }

    /// Render the document for `mode` with its catalog preset.
    pub fn render_mode(&self, mode: Mode) -> Result<ConfigDocument, RenderError> {
        self.render(mode, presets::lookup(mode))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
