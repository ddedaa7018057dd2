//! Magical Wave library - audio-reactive layered rosettes

pub mod audio;
pub mod cli;
pub mod driver;
pub mod error;
pub mod params;
pub mod recording;
pub mod rendering;
pub mod rosette;
pub mod scheduler;
pub mod spectrum;
pub mod surface;

pub use driver::{AnimationDriver, DriverState, FrameOutcome};
pub use error::{Result, SceneError};
pub use rosette::RosetteGeometry;
