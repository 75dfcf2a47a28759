//! `nightcam serve`: run the control API in the foreground.

use anyhow::{Context, Result};
use clap::Args;

use nightcam_daemon::start_blocking;

use super::ConfigArg;

/// Arguments for `nightcam serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub settings: ConfigArg,

    /// Override the listen port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Override the listen address.
    #[arg(long)]
    pub bind: Option<String>,
}

impl ServeArgs {
    pub fn run(self) -> Result<()> {
        let mut settings = self.settings.load()?;
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(bind) = self.bind {
            settings.bind = bind;
        }
        start_blocking(settings).context("control API exited with error")
    }
}
