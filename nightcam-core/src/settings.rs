//! Runtime settings, loaded from YAML.
//!
//! # Storage layout
//!
//! ```text
//! <config_dir>/nightcam/nightcam.yml   (optional; every key has a default)
//! ```
//!
//! # API pattern
//!
//! - `load_at(path)`: explicit file; a missing file is an error. Used by
//!   `--config` and by tests with `TempDir`.
//! - `load()`: derives the path from `dirs::config_dir()`; a missing file
//!   yields [`Settings::default`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// What to do with the freshly written config when the service refuses to restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OnRestartFailure {
    /// Leave the new document in place; the advertised mode stays unchanged.
    #[default]
    Keep,
    /// Restore the previous document (or remove the file if there was none).
    Rollback,
}

/// Log line format for the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Control API and transition settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub bind: String,
    pub port: u16,
    /// Config file read by the streaming service.
    pub config_path: PathBuf,
    /// Appended to `config_path` to name the single backup copy.
    pub backup_suffix: String,
    /// systemd unit restarted after every write.
    pub service: String,
    pub use_sudo: bool,
    /// `0` waits for `systemctl` indefinitely.
    pub restart_timeout_secs: u64,
    /// Total restart attempts per transition (at least 1).
    pub restart_attempts: u32,
    pub on_restart_failure: OnRestartFailure,
    /// Name of the single media path in the rendered document.
    pub media_path: String,
    /// Port of the WebRTC viewer that `GET /` redirects to.
    pub viewer_port: u16,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
            config_path: PathBuf::from("/home/pi/baby-monitor/config/mediamtx.yml"),
            backup_suffix: ".bak".to_string(),
            service: "baby-monitor".to_string(),
            use_sudo: true,
            restart_timeout_secs: 30,
            restart_attempts: 1,
            on_restart_failure: OnRestartFailure::Keep,
            media_path: "baby-monitor".to_string(),
            viewer_port: 8889,
            log_format: LogFormat::Text,
        }
    }
}

impl Settings {
    /// Load settings from an explicit YAML file.
    ///
    /// Returns `SettingsError::NotFound` if absent, `SettingsError::Parse`
    /// (with path + line context) if malformed.
    pub fn load_at(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Err(SettingsError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_yaml::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from the default location, falling back to defaults when no file exists.
    pub fn load() -> Result<Self, SettingsError> {
        match default_path() {
            Some(path) if path.exists() => Self::load_at(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.restart_attempts == 0 {
            return Err(SettingsError::Invalid {
                key: "restart_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.backup_suffix.is_empty() {
            return Err(SettingsError::Invalid {
                key: "backup_suffix",
                reason: "must not be empty".to_string(),
            });
        }
        if self.media_path.is_empty() || self.media_path.contains(char::is_whitespace) {
            return Err(SettingsError::Invalid {
                key: "media_path",
                reason: format!("'{}' is not a usable path name", self.media_path),
            });
        }
        if self.service.trim().is_empty() {
            return Err(SettingsError::Invalid {
                key: "service",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// `<config_path><backup_suffix>`, e.g. `mediamtx.yml.bak`.
    pub fn backup_path(&self) -> PathBuf {
        backup_path_for(&self.config_path, &self.backup_suffix)
    }

    /// `None` when the restart call may block indefinitely.
    pub fn restart_timeout(&self) -> Option<Duration> {
        (self.restart_timeout_secs > 0).then(|| Duration::from_secs(self.restart_timeout_secs))
    }

    /// `bind:port` listen address.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Sibling backup path: the suffix is appended to the full file name.
pub fn backup_path_for(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

/// `<config_dir>/nightcam/nightcam.yml`, if a config dir can be determined.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nightcam").join("nightcam.yml"))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
