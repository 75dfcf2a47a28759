//! `nightcam render <mode>`: print the config document for a mode.

use anyhow::{Context, Result};
use clap::Args;

use nightcam_core::Mode;

use super::{renderer_for, ConfigArg};

/// Arguments for `nightcam render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Mode to render: day or night.
    pub mode: Mode,

    #[command(flatten)]
    pub settings: ConfigArg,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.settings.load()?;
        let document = renderer_for(&settings)?
            .render_mode(self.mode)
            .with_context(|| format!("failed to render {} config", self.mode))?;
        print!("{document}");
        Ok(())
    }
}
