//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::error::Result;
use crate::params::{RecordingConfig, RenderConfig, SceneConfig};
use crate::surface::Color;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "magical-wave")]
#[command(about = "Audio-reactive rosette visualizer", long_about = None)]
pub struct Args {
    /// Audio file to play, WAV or MP3 (or drop one onto the window)
    #[arg(value_name = "AUDIO")]
    pub audio: Option<PathBuf>,

    /// Record frames instead of playing live (duration in seconds)
    #[arg(long, value_name = "SECONDS", requires = "audio")]
    pub record: Option<f32>,

    /// Output directory for recorded frames
    #[arg(long, value_name = "DIR", default_value = "recording")]
    pub output: PathBuf,

    /// Recording frame rate
    #[arg(long, value_name = "N", default_value = "60")]
    pub fps: u32,

    /// Canvas size (square, pixels)
    #[arg(long, value_name = "PX", default_value = "900")]
    pub size: u32,

    /// Petals per rosette
    #[arg(long, value_name = "N", default_value = "64")]
    pub petals: usize,

    /// Number of stacked rosettes
    #[arg(long, value_name = "N", default_value = "3")]
    pub layers: usize,

    /// Rosette fill, e.g. "rgba(241, 240, 237, 0.1)" or "#f1f0ed1a"
    #[arg(long, value_name = "COLOR")]
    pub fill: Option<Color>,

    /// Color behind the rosettes
    #[arg(long, value_name = "COLOR")]
    pub backdrop: Option<Color>,
}

impl Args {
    /// Scene layout from the arguments
    pub fn scene_config(&self) -> Result<SceneConfig> {
        let defaults = SceneConfig::default();
        let config = SceneConfig {
            canvas_width: self.size,
            canvas_height: self.size,
            petal_count: self.petals,
            layer_count: self.layers,
            fill: self.fill.unwrap_or(defaults.fill),
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    pub fn render_config(&self) -> RenderConfig {
        let defaults = RenderConfig::default();
        RenderConfig {
            backdrop: self.backdrop.unwrap_or(defaults.backdrop),
            ..defaults
        }
    }

    /// Recording configuration, if recording mode is enabled
    pub fn recording_config(&self) -> Result<Option<RecordingConfig>> {
        let Some(duration) = self.record else {
            return Ok(None);
        };

        let config = RecordingConfig {
            output_dir: self.output.clone(),
            fps: self.fps,
            ..RecordingConfig::new(duration)
        };
        config.validate()?;
        Ok(Some(config))
    }
}
