//! Live playback through the default output device, tapped for analysis.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{decode_audio, AudioIngest, DecodedAudio};
use crate::error::{Result, SceneError};
use crate::params::AnalyserConfig;
use crate::spectrum::SpectrumAnalyser;

/// Audio system playing a decoded buffer and analysing what it plays
pub struct CpalAudio {
    analyser: SpectrumAnalyser,

    /// Most recent mono output samples (shared with the audio callback)
    tap: Arc<Mutex<Vec<f32>>>,

    /// Render-thread copy of the tap, reused every frame
    window: Vec<f32>,

    /// Set by the audio callback once the buffer has been played out
    ended: Arc<AtomicBool>,

    /// Audio output stream (kept alive while playing)
    stream: Option<cpal::Stream>,
}

impl CpalAudio {
    pub fn new(config: AnalyserConfig) -> Result<Self> {
        let analyser = SpectrumAnalyser::new(config)?;
        Ok(Self {
            analyser,
            tap: Arc::new(Mutex::new(Vec::new())),
            window: Vec::new(),
            ended: Arc::new(AtomicBool::new(false)),
            stream: None,
        })
    }
}

impl AudioIngest for CpalAudio {
    type Buffer = DecodedAudio;

    fn decode(&mut self, bytes: &[u8]) -> Result<DecodedAudio> {
        decode_audio(bytes)
    }

    fn connect_and_start(&mut self, buffer: DecodedAudio) -> Result<()> {
        // Setup audio output device
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SceneError::Playback("No audio output device found".to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| SceneError::Playback(format!("Failed to get audio config: {}", e)))?;

        info!(
            "Audio: {} @ {}Hz",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            config.sample_rate().0
        );

        let out_channels = config.channels().max(1) as usize;
        // Source frames advanced per output frame
        let step = buffer.sample_rate() as f64 / config.sample_rate().0 as f64;
        let total_frames = buffer.frame_count() as f64;
        let tap_limit = 2 * self.analyser.config().fft_size;

        self.ended.store(false, Ordering::Release);
        if let Ok(mut tap) = self.tap.lock() {
            tap.clear();
        }
        self.analyser.reset();

        let tap = Arc::clone(&self.tap);
        let ended = Arc::clone(&self.ended);
        let mut position = 0.0f64;

        // Build audio output stream
        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let Ok(mut tap) = tap.lock() else {
                        data.fill(0.0);
                        return;
                    };

                    for frame in data.chunks_mut(out_channels) {
                        if position >= total_frames {
                            frame.fill(0.0);
                            ended.store(true, Ordering::Release);
                            continue;
                        }

                        // Linear interpolation between neighbouring source frames
                        let idx = position as usize;
                        let frac = (position - idx as f64) as f32;
                        for (channel, out) in frame.iter_mut().enumerate() {
                            let a = buffer.sample(idx, channel);
                            let b = buffer.sample(idx + 1, channel);
                            *out = (a + (b - a) * frac).clamp(-1.0, 1.0);
                        }

                        tap.push(buffer.mono(idx)); // Accumulate for analysis
                        position += step;
                    }

                    if tap.len() > tap_limit {
                        let excess = tap.len() - tap_limit;
                        tap.drain(..excess);
                    }
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| SceneError::Playback(format!("Failed to build audio stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| SceneError::Playback(format!("Failed to start audio stream: {}", e)))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                warn!("Failed to pause audio stream: {}", e);
            }
        }
    }

    fn current_frequency_magnitudes(&mut self) -> &[u8] {
        self.window.clear();
        if let Ok(tap) = self.tap.lock() {
            self.window.extend_from_slice(&tap);
        }
        self.analyser.analyse(&self.window)
    }

    fn has_ended(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }
}
