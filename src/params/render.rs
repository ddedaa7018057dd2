//! Presentation and recording configuration.

use std::path::PathBuf;

use crate::error::{Result, SceneError};
use crate::surface::Color;

/// Window presentation configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window title
    pub title: String,

    /// Color behind the canvas, shown wherever nothing has been drawn
    pub backdrop: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "Magical Wave".to_string(),
            backdrop: Color::rgb(20, 22, 28),
        }
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds); recording also ends with the audio
    pub duration_secs: f32,

    /// Output directory for frames
    pub output_dir: PathBuf,

    /// Frame rate (FPS)
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: PathBuf::from("recording"),
            fps: 60,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil() as usize
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> PathBuf {
        self.output_dir.join("frames")
    }

    /// Path of frame `index`
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.frames_dir().join(format!("frame_{:05}.png", index))
    }

    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(SceneError::InvalidConfiguration(
                "recording FPS must be > 0".to_string(),
            ));
        }
        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return Err(SceneError::InvalidConfiguration(format!(
                "recording duration must be > 0, got {}",
                self.duration_secs
            )));
        }
        Ok(())
    }
}
