//! `nightcam diff <mode>`: show what switching to a mode would write.

use anyhow::{Context, Result};
use clap::Args;

use nightcam_core::Mode;
use nightcam_switch::diff_against;

use super::{renderer_for, ConfigArg};

/// Arguments for `nightcam diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Mode to compare the on-disk config against.
    pub mode: Mode,

    #[command(flatten)]
    pub settings: ConfigArg,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.settings.load()?;
        let renderer = renderer_for(&settings)?;

        let diff = diff_against(&renderer, self.mode, &settings.config_path)
            .with_context(|| format!("diff failed for {}", settings.config_path.display()))?;

        let Some(diff) = diff else {
            println!(
                "No differences: {} already holds the {} config.",
                settings.config_path.display(),
                self.mode
            );
            return Ok(());
        };

        print!("{}", diff.unified_diff);
        if !diff.unified_diff.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
