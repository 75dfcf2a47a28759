pub mod diff;
pub mod night;
pub mod presets;
pub mod render;
pub mod serve;
pub mod status;
pub mod unit;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use nightcam_core::Settings;
use nightcam_renderer::ConfigRenderer;

/// `--config FILE`, shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArg {
    /// Settings file (YAML). Defaults to <config_dir>/nightcam/nightcam.yml if present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ConfigArg {
    pub fn load(&self) -> Result<Settings> {
        match &self.config {
            Some(path) => Settings::load_at(path)
                .with_context(|| format!("failed to load settings from {}", path.display())),
            None => Settings::load().context("failed to load default settings"),
        }
    }
}

/// Renderer for the media path named in `settings`.
pub fn renderer_for(settings: &Settings) -> Result<ConfigRenderer> {
    ConfigRenderer::new(settings.media_path.as_str())
        .with_context(|| format!("invalid media path '{}'", settings.media_path))
}

/// Base URL of the control API: `--url`, or the configured port on loopback.
pub fn base_url(url: Option<&str>, settings: &Settings) -> String {
    match url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => format!("http://127.0.0.1:{}", settings.port),
    }
}

/// HTTP agent for talking to a running server. Reads are unbounded because a
/// transition waits for the service restart.
pub fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .build()
}
