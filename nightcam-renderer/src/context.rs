//! Document context: typed entries that the template lays out.
//!
//! Every value in the document goes through [`Scalar`], so quoting and number
//! formatting are decided by the value's type, never by the template.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use nightcam_core::{Mode, Preset};

/// A single YAML scalar with its rendering rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// Rendered as a bare number.
    Int(i64),
    /// `true` / `false`.
    Bool(bool),
    /// MediaMTX on/off switch: `yes` / `no`.
    Switch(bool),
    /// Double-quoted string; `\` and `"` are escaped.
    Quoted(Cow<'static, str>),
    /// Emitted verbatim. Only for fixed tokens such as `:9997` or `[stdout]`.
    Bare(&'static str),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Switch(true) => f.write_str("yes"),
            Scalar::Switch(false) => f.write_str("no"),
            Scalar::Quoted(s) => {
                f.write_str("\"")?;
                for ch in s.chars() {
                    match ch {
                        '\\' => f.write_str("\\\\")?,
                        '"' => f.write_str("\\\"")?,
                        '\n' => f.write_str("\\n")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("\"")
            }
            Scalar::Bare(s) => f.write_str(s),
        }
    }
}

impl Scalar {
    const fn quoted(s: &'static str) -> Self {
        Scalar::Quoted(Cow::Borrowed(s))
    }
}

/// One `key: value` line, already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub key: &'static str,
    pub value: String,
}

impl Entry {
    fn new(key: &'static str, value: Scalar) -> Self {
        Self {
            key,
            value: value.to_string(),
        }
    }
}

/// Service-level toggles, grouped as they appear in the document.
/// Fixed for every mode.
const SERVICE_SECTIONS: &[&[(&str, Scalar)]] = &[
    &[
        ("logLevel", Scalar::Bare("info")),
        ("logDestinations", Scalar::Bare("[stdout]")),
    ],
    &[
        ("api", Scalar::Switch(true)),
        ("apiAddress", Scalar::Bare(":9997")),
    ],
    &[("playback", Scalar::Switch(false))],
    &[
        ("rtsp", Scalar::Switch(true)),
        ("rtspAddress", Scalar::Bare(":8554")),
    ],
    &[("rtmp", Scalar::Switch(false))],
    &[
        ("hls", Scalar::Switch(true)),
        ("hlsAddress", Scalar::Bare(":8888")),
        ("hlsAlwaysRemux", Scalar::Switch(false)),
    ],
    &[
        ("webrtc", Scalar::Switch(true)),
        ("webrtcAddress", Scalar::Bare(":8889")),
        ("webrtcEncryption", Scalar::Switch(false)),
        ("webrtcICEServers2", Scalar::Bare("[]")),
        ("webrtcLocalUDPAddress", Scalar::Bare(":8189")),
    ],
    &[("srt", Scalar::Switch(false))],
];

const ENCODER_PROFILE: Scalar = Scalar::Bare("baseline");
const ENCODER_LEVEL: Scalar = Scalar::quoted("4.1");

/// Serializable rendering payload for the MediaMTX template.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentContext {
    pub mode: Mode,
    pub sections: Vec<Vec<Entry>>,
    pub path_name: String,
    pub path: Vec<Entry>,
}

impl DocumentContext {
    /// Build the context for `mode` with camera parameters taken verbatim from `preset`.
    pub fn new(mode: Mode, preset: &Preset, path_name: &str) -> Self {
        let sections = SERVICE_SECTIONS
            .iter()
            .map(|section| {
                section
                    .iter()
                    .map(|&(key, ref value)| Entry::new(key, value.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();

        let path = vec![
            Entry::new("source", Scalar::Bare("rpiCamera")),
            Entry::new("rpiCameraWidth", Scalar::Int(preset.width.into())),
            Entry::new("rpiCameraHeight", Scalar::Int(preset.height.into())),
            Entry::new("rpiCameraFPS", Scalar::Int(preset.fps.into())),
            Entry::new("rpiCameraCodec", Scalar::Bare("auto")),
            Entry::new("rpiCameraBitrate", Scalar::Int(preset.bitrate.into())),
            Entry::new("rpiCameraProfile", ENCODER_PROFILE),
            Entry::new("rpiCameraLevel", ENCODER_LEVEL),
            Entry::new("rpiCameraExposure", Scalar::quoted(preset.exposure.as_str())),
            Entry::new("rpiCameraAWB", Scalar::quoted(preset.awb.as_str())),
            Entry::new("rpiCameraAfMode", Scalar::quoted(preset.af_mode.as_str())),
            Entry::new("rpiCameraEV", Scalar::Int(preset.ev.into())),
            Entry::new("rpiCameraGain", Scalar::Int(preset.gain.into())),
            Entry::new("rpiCameraDenoise", Scalar::quoted(preset.denoise.as_str())),
            Entry::new("record", Scalar::Bool(false)),
        ];

        DocumentContext {
            mode,
            sections,
            path_name: path_name.to_string(),
            path,
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, tera::Error> {
        tera::Context::from_serialize(self)
    }
}
