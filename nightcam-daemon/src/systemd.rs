//! systemd unit for running the control API as a service.

use std::path::Path;

/// Unit file name installed under `/etc/systemd/system`.
pub const UNIT_NAME: &str = "nightcam.service";

/// Generate a unit that runs `<binary> serve` after the streaming `service`.
pub fn generate_unit(binary_path: &Path, settings_path: Option<&Path>, service: &str) -> String {
    let mut exec = format!("{} serve", quote_arg(&binary_path.display().to_string()));
    if let Some(path) = settings_path {
        exec.push_str(" --config ");
        exec.push_str(&quote_arg(&path.display().to_string()));
    }

    format!(
        r#"[Unit]
Description=nightcam day/night camera control API
After=network-online.target {service}.service
Wants=network-online.target

[Service]
Type=simple
ExecStart={exec}
Restart=on-failure
RestartSec=5

[Install]
WantedBy=multi-user.target
"#,
        service = service,
        exec = exec,
    )
}

fn quote_arg(arg: &str) -> String {
    if arg.contains(char::is_whitespace) || arg.contains('"') {
        format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}
