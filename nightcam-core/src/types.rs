//! Domain types for camera mode switching.
//!
//! [`Mode`] is a closed enum, so every lookup over it is total. The
//! [`Preset`] policy fields are enums as well; their `as_str` spelling is
//! exactly what the camera driver expects in the rendered document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseModeError;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// The camera operating profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Day,
    Night,
}

impl Mode {
    /// Both modes in a stable order.
    pub fn all() -> &'static [Mode] {
        &[Mode::Day, Mode::Night]
    }

    /// `night` when `enabled`, otherwise `day`.
    pub fn from_night_enabled(enabled: bool) -> Self {
        if enabled {
            Mode::Night
        } else {
            Mode::Day
        }
    }

    pub fn is_night(self) -> bool {
        self == Mode::Night
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Day => "day",
            Mode::Night => "night",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Mode::Day),
            "night" => Ok(Mode::Night),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Preset policy enums
// ---------------------------------------------------------------------------

/// Sensor exposure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exposure {
    Normal,
    Long,
}

impl Exposure {
    pub fn as_str(self) -> &'static str {
        match self {
            Exposure::Normal => "normal",
            Exposure::Long => "long",
        }
    }
}

/// Auto-white-balance policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Awb {
    Auto,
}

impl Awb {
    pub fn as_str(self) -> &'static str {
        match self {
            Awb::Auto => "auto",
        }
    }
}

/// Autofocus policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfMode {
    Continuous,
}

impl AfMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AfMode::Continuous => "continuous",
        }
    }
}

/// Denoise policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denoise {
    Off,
    CdnHq,
}

impl Denoise {
    pub fn as_str(self) -> &'static str {
        match self {
            Denoise::Off => "off",
            Denoise::CdnHq => "cdn_hq",
        }
    }
}

// ---------------------------------------------------------------------------
// Preset
// ---------------------------------------------------------------------------

/// Immutable bundle of camera parameters for one [`Mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Bits per second.
    pub bitrate: u32,
    pub exposure: Exposure,
    pub awb: Awb,
    pub af_mode: AfMode,
    /// Exposure compensation in stops.
    pub ev: i32,
    pub gain: u32,
    pub denoise: Denoise,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
