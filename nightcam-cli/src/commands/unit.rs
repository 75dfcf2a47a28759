//! `nightcam unit`: print a systemd unit for the control API.

use anyhow::{Context, Result};
use clap::Args;

use nightcam_daemon::{generate_unit, systemd::UNIT_NAME};

use super::ConfigArg;

/// Arguments for `nightcam unit`.
#[derive(Args, Debug)]
pub struct UnitArgs {
    #[command(flatten)]
    pub settings: ConfigArg,
}

impl UnitArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.settings.load()?;
        let binary = std::env::current_exe().context("could not determine nightcam binary path")?;
        let unit = generate_unit(&binary, self.settings.config.as_deref(), &settings.service);

        println!("# Save as /etc/systemd/system/{UNIT_NAME}");
        print!("{unit}");
        Ok(())
    }
}
