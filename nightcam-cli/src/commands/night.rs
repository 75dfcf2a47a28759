//! `nightcam night on|off`: request a transition from a running server.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Deserialize;
use serde_json::json;

use super::{base_url, http_agent, ConfigArg};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

/// Arguments for `nightcam night`.
#[derive(Args, Debug)]
pub struct NightArgs {
    /// `on` selects the night preset, `off` the day preset.
    #[arg(value_enum)]
    pub state: Toggle,

    /// Control API base URL (default: http://127.0.0.1:<port>).
    #[arg(long)]
    pub url: Option<String>,

    #[command(flatten)]
    pub settings: ConfigArg,
}

#[derive(Debug, Deserialize)]
struct NightModeReply {
    success: bool,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl NightArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.settings.load()?;
        let url = format!("{}/api/night-mode", base_url(self.url.as_deref(), &settings));
        let enabled = self.state == Toggle::On;

        let response = match http_agent()
            .post(&url)
            .send_json(json!({ "enabled": enabled }))
        {
            Ok(response) => response,
            // Failed transitions answer 500 with a JSON body worth showing.
            Err(ureq::Error::Status(_, response)) => response,
            Err(err) => return Err(err).with_context(|| format!("request to {url} failed")),
        };

        let reply: NightModeReply = response
            .into_json()
            .with_context(|| format!("unexpected response from {url}"))?;

        if !reply.success {
            bail!(
                "mode change failed: {}",
                reply.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mode = reply.mode.as_deref().unwrap_or("unknown");
        match reply.message {
            Some(message) => println!("{} ({message})", mode.bold()),
            None => println!("switched to {}", mode.green().bold()),
        }
        Ok(())
    }
}
