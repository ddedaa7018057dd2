//! Frame-clocked ingest for recordings: no output device, time advances one
//! video frame per spectrum query.

use super::{decode_audio, AudioIngest, DecodedAudio};
use crate::error::{Result, SceneError};
use crate::params::AnalyserConfig;
use crate::spectrum::SpectrumAnalyser;

pub struct OfflineAudio {
    analyser: SpectrumAnalyser,
    fps: u32,
    /// Spectrum queries answered since start
    frame: u64,
    buffer: Option<DecodedAudio>,
    window: Vec<f32>,
}

impl OfflineAudio {
    pub fn new(config: AnalyserConfig, fps: u32) -> Result<Self> {
        if fps == 0 {
            return Err(SceneError::InvalidConfiguration(
                "offline frame rate must be > 0".to_string(),
            ));
        }
        Ok(Self {
            analyser: SpectrumAnalyser::new(config)?,
            fps,
            frame: 0,
            buffer: None,
            window: Vec::new(),
        })
    }

    /// Playback time of the next query (seconds)
    pub fn elapsed_secs(&self) -> f64 {
        self.frame as f64 / self.fps as f64
    }

    /// Audio frame reached by the clock
    fn playhead(&self, sample_rate: u32) -> usize {
        (self.frame * sample_rate as u64 / self.fps as u64) as usize
    }
}

impl AudioIngest for OfflineAudio {
    type Buffer = DecodedAudio;

    fn decode(&mut self, bytes: &[u8]) -> Result<DecodedAudio> {
        decode_audio(bytes)
    }

    fn connect_and_start(&mut self, buffer: DecodedAudio) -> Result<()> {
        self.frame = 0;
        self.analyser.reset();
        self.buffer = Some(buffer);
        Ok(())
    }

    fn stop(&mut self) {
        self.buffer = None;
    }

    fn current_frequency_magnitudes(&mut self) -> &[u8] {
        let Some(audio) = &self.buffer else {
            return self.analyser.magnitudes();
        };

        let end = self.playhead(audio.sample_rate());
        let size = self.analyser.config().fft_size;
        audio.mono_window_into(end, size, &mut self.window);
        self.frame += 1;

        self.analyser.analyse(&self.window)
    }

    fn has_ended(&self) -> bool {
        self.buffer
            .as_ref()
            .is_some_and(|audio| self.playhead(audio.sample_rate()) >= audio.frame_count())
    }
}
