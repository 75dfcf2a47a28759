//! nightcam core library: domain types, preset catalog, settings, errors.
//!
//! - [`types`]: [`Mode`] and the typed [`Preset`] record
//! - [`presets`]: the fixed day/night catalog
//! - [`settings`]: YAML-backed runtime [`Settings`]
//! - [`error`]: [`SettingsError`], [`ParseModeError`]

pub mod error;
pub mod presets;
pub mod settings;
pub mod types;

pub use error::{ParseModeError, SettingsError};
pub use settings::{LogFormat, OnRestartFailure, Settings};
pub use types::{AfMode, Awb, Denoise, Exposure, Mode, Preset};
