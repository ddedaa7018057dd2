//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers of the scene live here with:
//! - Units (pixels, radians, Hz, decibels)
//! - Documented ranges and meanings
//! - A `validate()` per group, run before anything is built from it

mod audio;
mod render;
mod scene;

// Re-export all types
pub use audio::{AnalyserConfig, SpectrumMapping};
pub use render::{RecordingConfig, RenderConfig};
pub use scene::{SceneConfig, MAX_CANVAS_SIZE};
