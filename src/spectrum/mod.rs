//! Spectrum analysis and the spectrum-to-geometry mapping.
//!
//! `analyser` turns time-domain audio into byte magnitudes; `sampler` reduces
//! those magnitudes to per-vertex rosette scale factors.

mod analyser;
mod sampler;

// Re-export public types
pub use analyser::{blackman_window, SpectrumAnalyser};
pub use sampler::{compute_scale_factors, downsample, lerp, smooth};
