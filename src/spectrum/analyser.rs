//! Byte frequency snapshot of the most recent audio window.
//!
//! Produces the same kind of data as a Web Audio `AnalyserNode` byte query:
//! Blackman-windowed FFT magnitudes, averaged over time, mapped from a
//! decibel range onto 0..=255.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::error::Result;
use crate::params::AnalyserConfig;

/// FFT analyser holding its smoothing state between snapshots
pub struct SpectrumAnalyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Time-averaged linear magnitude per bin
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
}

impl SpectrumAnalyser {
    pub fn new(config: AnalyserConfig) -> Result<Self> {
        config.validate()?;

        let size = config.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let bins = config.frequency_bin_count();

        Ok(Self {
            window: (0..size).map(|i| blackman_window(i, size)).collect(),
            buffer: vec![Complex::new(0.0, 0.0); size],
            scratch,
            smoothed: vec![0.0; bins],
            bytes: vec![0; bins],
            fft,
            config,
        })
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    /// Length of every snapshot
    pub fn frequency_bin_count(&self) -> usize {
        self.bytes.len()
    }

    /// Most recent snapshot
    pub fn magnitudes(&self) -> &[u8] {
        &self.bytes
    }

    /// Forget the time-averaging history
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
        self.bytes.fill(0);
    }

    /// Analyse the last `fft_size` samples of `samples` (zero-padded in front
    /// when fewer are available) and return the updated snapshot
    pub fn analyse(&mut self, samples: &[f32]) -> &[u8] {
        let size = self.config.fft_size;
        let recent = &samples[samples.len().saturating_sub(size)..];
        let pad = size - recent.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let tau = self.config.smoothing_time_constant;
        let min_db = self.config.min_decibels;
        let range_db = self.config.max_decibels - min_db;

        for ((bin, avg), byte) in self
            .buffer
            .iter()
            .zip(self.smoothed.iter_mut())
            .zip(self.bytes.iter_mut())
        {
            let magnitude = bin.norm() / size as f32;
            let next = tau * *avg + (1.0 - tau) * magnitude;
            *avg = if next.is_finite() { next } else { 0.0 };
            *byte = to_byte(*avg, min_db, range_db);
        }

        &self.bytes
    }
}

fn to_byte(magnitude: f32, min_db: f32, range_db: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    (255.0 * (db - min_db) / range_db).clamp(0.0, 255.0) as u8
}

/// Blackman window (alpha = 0.16) for FFT analysis
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let phase = 2.0 * PI * index as f32 / size as f32;
    0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
}
