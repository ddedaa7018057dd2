//! Spectrum analysis and spectrum-to-scale mapping configuration.

use crate::error::{Result, SceneError};

/// Byte-spectrum analyser configuration
///
/// Defaults follow the Web Audio `AnalyserNode`, whose byte snapshot the
/// scale mapping was tuned against.
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// FFT window size in samples (power of 2; half of it is the bin count)
    pub fft_size: usize,

    /// Weight of the previous frame in the per-bin magnitude average, in [0, 1)
    pub smoothing_time_constant: f32,

    /// Magnitude (dB) mapped to byte 0
    pub min_decibels: f32,

    /// Magnitude (dB) mapped to byte 255
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048, // 1024 bins
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of magnitude bins in each snapshot
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<()> {
        if self.fft_size < 32 || !self.fft_size.is_power_of_two() {
            return Err(SceneError::InvalidConfiguration(format!(
                "FFT size must be a power of 2 >= 32, got {}",
                self.fft_size
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing_time_constant) {
            return Err(SceneError::InvalidConfiguration(format!(
                "smoothing time constant must be in [0, 1), got {}",
                self.smoothing_time_constant
            )));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(SceneError::InvalidConfiguration(format!(
                "decibel range is empty: [{}, {}]",
                self.min_decibels, self.max_decibels
            )));
        }
        Ok(())
    }
}

/// Mapping from a byte spectrum to per-vertex scale factors
#[derive(Debug, Clone)]
pub struct SpectrumMapping {
    /// Raw bins averaged into one band
    pub downsample_factor: usize,

    /// Scale at magnitude 0 (rest shape)
    pub min_scale: f64,

    /// Scale at magnitude 255
    pub max_scale: f64,

    /// Neighbours on each side in the circular moving average (window = 2n + 1)
    pub smoothing_half_width: usize,
}

impl Default for SpectrumMapping {
    fn default() -> Self {
        Self {
            downsample_factor: 10,
            min_scale: 1.0,
            max_scale: 1.15,
            smoothing_half_width: 4, // 9-tap window
        }
    }
}

impl SpectrumMapping {
    pub fn validate(&self) -> Result<()> {
        if self.downsample_factor == 0 {
            return Err(SceneError::InvalidConfiguration(
                "downsample factor must be >= 1".to_string(),
            ));
        }
        if !(self.min_scale > 0.0 && self.max_scale.is_finite()) {
            return Err(SceneError::InvalidConfiguration(format!(
                "scale range must be positive, got [{}, {}]",
                self.min_scale, self.max_scale
            )));
        }
        if self.max_scale < self.min_scale {
            return Err(SceneError::InvalidConfiguration(format!(
                "max scale {} is below min scale {}",
                self.max_scale, self.min_scale
            )));
        }
        Ok(())
    }
}
