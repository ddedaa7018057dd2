//! Audio ingest: decoding, playback and live spectrum snapshots.
//!
//! The animation only talks to [`AudioIngest`]; `CpalAudio` plays through the
//! default output device, `OfflineAudio` advances a frame clock instead so
//! recordings are deterministic.

mod decode;
mod offline;
mod playback;

// Re-export public types
pub use decode::{decode_audio, load_file, read_file, spawn_load};
pub use offline::OfflineAudio;
pub use playback::CpalAudio;

use crate::error::{Result, SceneError};

/// Audio decoding/playback service feeding the animation
pub trait AudioIngest {
    /// Playable decoded audio
    type Buffer;

    fn decode(&mut self, bytes: &[u8]) -> Result<Self::Buffer>;

    /// Route the buffer to the output (and the analyser) and start playing
    fn connect_and_start(&mut self, buffer: Self::Buffer) -> Result<()>;

    fn stop(&mut self);

    /// Byte magnitude snapshot of what is playing now; must not block
    fn current_frequency_magnitudes(&mut self) -> &[u8];

    /// True once playback reached the end of the buffer
    fn has_ended(&self) -> bool;
}

/// Decoded PCM audio (interleaved, normalized to [-1, 1])
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl DecodedAudio {
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        if channels == 0 || sample_rate == 0 {
            return Err(SceneError::Decode(format!(
                "unsupported layout: {} channel(s) @ {}Hz",
                channels, sample_rate
            )));
        }
        if samples.len() < channels as usize {
            return Err(SceneError::Decode("audio contains no samples".to_string()));
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of complete frames (one sample per channel)
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Sample of `channel` at `frame`, silence past the end
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        if frame >= self.frame_count() {
            return 0.0;
        }
        self.samples[frame * self.channels as usize + channel % self.channels as usize]
    }

    /// Channel average at `frame`
    pub fn mono(&self, frame: usize) -> f32 {
        let channels = self.channels as usize;
        (0..channels).map(|c| self.sample(frame, c)).sum::<f32>() / channels as f32
    }

    /// Fill `out` with the `len` mono frames ending just before `end_frame`
    /// (silence before the start)
    pub fn mono_window_into(&self, end_frame: usize, len: usize, out: &mut Vec<f32>) {
        out.clear();
        out.extend((0..len).map(|i| {
            (end_frame + i)
                .checked_sub(len)
                .map_or(0.0, |frame| self.mono(frame))
        }));
    }
}
