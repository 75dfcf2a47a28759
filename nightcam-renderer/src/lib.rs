//! # nightcam-renderer
//!
//! Renders the MediaMTX configuration document for a camera [`Mode`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nightcam_core::{presets, Mode};
//! use nightcam_renderer::ConfigRenderer;
//!
//! fn preview() {
//!     if let Ok(renderer) = ConfigRenderer::new("baby-monitor") {
//!         if let Ok(doc) = renderer.render(Mode::Night, presets::lookup(Mode::Night)) {
//!             print!("{doc}");
//!         }
//!     }
//! }
//! ```
//!
//! [`Mode`]: nightcam_core::Mode

pub mod context;
pub mod engine;
pub mod error;

pub use context::{DocumentContext, Entry, Scalar};
pub use engine::{ConfigDocument, ConfigRenderer};
pub use error::RenderError;
