//! nightcam: day/night camera mode control.
//!
//! # Usage
//!
//! ```text
//! nightcam serve [--config FILE] [--port N] [--bind ADDR]
//! nightcam status [--url URL] [--json]
//! nightcam night on|off [--url URL]
//! nightcam render day|night
//! nightcam diff day|night
//! nightcam presets
//! nightcam unit
//! ```
//!
//! Every command accepts `--config FILE`; without it settings come from
//! `<config_dir>/nightcam/nightcam.yml` when that file exists.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, night::NightArgs, presets::PresetsArgs, render::RenderArgs, serve::ServeArgs,
    status::StatusArgs, unit::UnitArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "nightcam",
    version,
    about = "Switch a streaming camera between day and night presets",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP control API in the foreground.
    Serve(ServeArgs),

    /// Show the mode reported by a running server and whether the config file matches it.
    Status(StatusArgs),

    /// Ask a running server to switch night mode on or off.
    Night(NightArgs),

    /// Print the config document for a mode.
    Render(RenderArgs),

    /// Show a unified diff of what switching to a mode would write.
    Diff(DiffArgs),

    /// List the camera presets.
    Presets(PresetsArgs),

    /// Print a systemd unit that runs the control API.
    Unit(UnitArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Night(args) => args.run(),
        Commands::Render(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Presets(args) => args.run(),
        Commands::Unit(args) => args.run(),
    }
}
