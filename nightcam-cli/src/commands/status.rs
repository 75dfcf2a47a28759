//! `nightcam status`: advertised mode and config drift.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tabled::{settings::Style, Table, Tabled};

use nightcam_core::{Mode, Settings};
use nightcam_renderer::ConfigRenderer;
use nightcam_switch::{drift, DriftSignal};

use super::{base_url, http_agent, renderer_for, ConfigArg};

/// Arguments for `nightcam status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Control API base URL (default: http://127.0.0.1:<port>).
    #[arg(long)]
    pub url: Option<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub settings: ConfigArg,
}

#[derive(Debug, Deserialize)]
struct ServerStatus {
    mode: Mode,
}

/// What the config file holds relative to the advertised mode.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigState {
    Missing,
    Current,
    Drifted { holds: Option<Mode> },
    /// Server unreachable, so there is no advertised mode to compare with.
    Unverified { holds: Option<Mode> },
}

#[derive(Debug)]
struct StatusReport {
    url: String,
    server_mode: Option<Mode>,
    config_path: PathBuf,
    config: ConfigState,
}

#[derive(Serialize)]
struct StatusReportJson {
    url: String,
    running: bool,
    mode: Option<Mode>,
    config: ConfigJson,
}

#[derive(Serialize)]
struct ConfigJson {
    path: String,
    state: &'static str,
    holds: Option<Mode>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "item")]
    item: &'static str,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "detail")]
    detail: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.settings.load()?;
        let url = base_url(self.url.as_deref(), &settings);
        let report = build_report(&settings, url)?;

        if self.json {
            print_json(report)?;
            return Ok(());
        }
        print_table(report);
        Ok(())
    }
}

fn build_report(settings: &Settings, url: String) -> Result<StatusReport> {
    let renderer = renderer_for(settings)?;
    let server_mode = query_mode(&url);
    let config = config_state(&renderer, settings, server_mode)?;
    Ok(StatusReport {
        url,
        server_mode,
        config_path: settings.config_path.clone(),
        config,
    })
}

/// `None` when the server cannot be reached or answers something unexpected.
fn query_mode(url: &str) -> Option<Mode> {
    let endpoint = format!("{url}/api/status");
    match http_agent().get(&endpoint).call() {
        Ok(response) => match response.into_json::<ServerStatus>() {
            Ok(status) => Some(status.mode),
            Err(err) => {
                eprintln!("{} unexpected reply from {endpoint}: {err}", "warning:".yellow());
                None
            }
        },
        Err(_) => None,
    }
}

fn config_state(
    renderer: &ConfigRenderer,
    settings: &Settings,
    server_mode: Option<Mode>,
) -> Result<ConfigState> {
    let path = &settings.config_path;
    let detect = || {
        drift::detect_mode(renderer, path)
            .with_context(|| format!("failed to read {}", path.display()))
    };

    let Some(mode) = server_mode else {
        if !path.exists() {
            return Ok(ConfigState::Missing);
        }
        return Ok(ConfigState::Unverified { holds: detect()? });
    };

    let signal = drift::check(renderer, mode, path)
        .with_context(|| format!("failed to check {}", path.display()))?;
    Ok(match signal {
        DriftSignal::Missing => ConfigState::Missing,
        DriftSignal::Current => ConfigState::Current,
        DriftSignal::Drifted { .. } => ConfigState::Drifted { holds: detect()? },
    })
}

fn state_key(state: &ConfigState) -> &'static str {
    match state {
        ConfigState::Missing => "missing",
        ConfigState::Current => "current",
        ConfigState::Drifted { .. } => "drifted",
        ConfigState::Unverified { .. } => "unverified",
    }
}

fn holds(state: &ConfigState) -> Option<Mode> {
    match state {
        ConfigState::Drifted { holds } | ConfigState::Unverified { holds } => *holds,
        ConfigState::Current | ConfigState::Missing => None,
    }
}

fn print_json(report: StatusReport) -> Result<()> {
    let held_mode = match &report.config {
        ConfigState::Current => report.server_mode,
        other => holds(other),
    };
    let payload = StatusReportJson {
        url: report.url,
        running: report.server_mode.is_some(),
        mode: report.server_mode,
        config: ConfigJson {
            path: report.config_path.display().to_string(),
            state: state_key(&report.config),
            holds: held_mode,
        },
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(report: StatusReport) {
    println!("nightcam v{} | {}", env!("CARGO_PKG_VERSION"), report.url);

    let server = match report.server_mode {
        Some(mode) => StatusTableRow {
            item: "server",
            state: "■".green().bold().to_string(),
            detail: format!("mode {}", mode.as_str().to_uppercase()),
        },
        None => StatusTableRow {
            item: "server",
            state: "■".bright_black().bold().to_string(),
            detail: "not reachable".to_string(),
        },
    };

    let held = |holds: Option<Mode>| match holds {
        Some(mode) => format!("holds the {mode} document"),
        None => "matches no preset (hand-edited?)".to_string(),
    };
    let (indicator, detail) = match &report.config {
        ConfigState::Current => ("■".green().bold(), "matches advertised mode".to_string()),
        ConfigState::Missing => ("■".bright_black().bold(), "not written yet".to_string()),
        ConfigState::Drifted { holds } => ("■".red().bold(), held(*holds)),
        ConfigState::Unverified { holds } => ("■".yellow().bold(), held(*holds)),
    };
    let config = StatusTableRow {
        item: "config",
        state: indicator.to_string(),
        detail: format!("{} ({})", report.config_path.display(), detail),
    };

    let mut table = Table::new(vec![server, config]);
    table.with(Style::rounded());
    println!("{table}");

    if let (ConfigState::Drifted { holds }, Some(advertised)) = (&report.config, report.server_mode) {
        println!("{}", drift_hint(advertised, *holds));
    }
}

/// Requesting the advertised mode is a no-op, so re-applying it means leaving it first.
fn drift_hint(advertised: Mode, holds: Option<Mode>) -> String {
    let away = Mode::from_night_enabled(!advertised.is_night());
    let back_again = format!(
        "run `nightcam night {}` then `nightcam night {}` to re-apply {advertised}",
        toggle_word(away),
        toggle_word(advertised),
    );
    match holds {
        Some(held) => format!(
            "The last restart likely failed: the file holds {held} while the server advertises \
             {advertised}. Run `nightcam night {}` to adopt the file, or {back_again}.",
            toggle_word(held),
        ),
        None => format!("The file matches no preset; {back_again}."),
    }
}

fn toggle_word(mode: Mode) -> &'static str {
    if mode.is_night() {
        "on"
    } else {
        "off"
    }
}
