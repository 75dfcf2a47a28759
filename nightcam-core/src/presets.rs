//! Fixed preset catalog, one [`Preset`] per [`Mode`].

use crate::types::{AfMode, Awb, Denoise, Exposure, Mode, Preset};

/// Daylight profile: full frame rate, neutral exposure.
pub const DAY: Preset = Preset {
    width: 1280,
    height: 720,
    fps: 30,
    bitrate: 2_000_000,
    exposure: Exposure::Normal,
    awb: Awb::Auto,
    af_mode: AfMode::Continuous,
    ev: 0,
    gain: 0,
    denoise: Denoise::Off,
};

/// Low-light profile: halved frame rate for longer exposure, boosted gain.
pub const NIGHT: Preset = Preset {
    width: 1280,
    height: 720,
    fps: 15,
    bitrate: 2_000_000,
    exposure: Exposure::Long,
    awb: Awb::Auto,
    af_mode: AfMode::Continuous,
    ev: 2,
    gain: 8,
    denoise: Denoise::CdnHq,
};

/// Preset for `mode`.
pub fn lookup(mode: Mode) -> &'static Preset {
    match mode {
        Mode::Day => &DAY,
        Mode::Night => &NIGHT,
    }
}
