//! `nightcam presets`: list the camera parameters for each mode.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use nightcam_core::{presets, Mode, Preset};

/// Arguments for `nightcam presets`.
#[derive(Args, Debug)]
pub struct PresetsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PresetJson {
    mode: Mode,
    #[serde(flatten)]
    preset: Preset,
}

#[derive(Tabled)]
struct PresetRow {
    #[tabled(rename = "mode")]
    mode: String,
    #[tabled(rename = "resolution")]
    resolution: String,
    #[tabled(rename = "fps")]
    fps: u32,
    #[tabled(rename = "bitrate")]
    bitrate: u32,
    #[tabled(rename = "exposure")]
    exposure: &'static str,
    #[tabled(rename = "awb")]
    awb: &'static str,
    #[tabled(rename = "af")]
    af_mode: &'static str,
    #[tabled(rename = "ev")]
    ev: i32,
    #[tabled(rename = "gain")]
    gain: u32,
    #[tabled(rename = "denoise")]
    denoise: &'static str,
}

impl PresetsArgs {
    pub fn run(self) -> Result<()> {
        if self.json {
            let payload: Vec<PresetJson> = Mode::all()
                .iter()
                .map(|mode| PresetJson {
                    mode: *mode,
                    preset: *presets::lookup(*mode),
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize presets")?
            );
            return Ok(());
        }

        let rows: Vec<PresetRow> = Mode::all()
            .iter()
            .map(|mode| {
                let p = presets::lookup(*mode);
                PresetRow {
                    mode: mode.as_str().to_uppercase().bold().to_string(),
                    resolution: format!("{}x{}", p.width, p.height),
                    fps: p.fps,
                    bitrate: p.bitrate,
                    exposure: p.exposure.as_str(),
                    awb: p.awb.as_str(),
                    af_mode: p.af_mode.as_str(),
                    ev: p.ev,
                    gain: p.gain,
                    denoise: p.denoise.as_str(),
                }
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
