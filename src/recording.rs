//! Offline recording: renders the animation into numbered PNG frames.

use log::info;
use std::path::Path;

use crate::audio::{load_file, AudioIngest, OfflineAudio};
use crate::driver::{AnimationDriver, FrameOutcome};
use crate::error::Result;
use crate::params::{AnalyserConfig, RecordingConfig, RenderConfig, SceneConfig, SpectrumMapping};
use crate::scheduler::{FrameScheduler, RefreshScheduler};
use crate::surface::CanvasSurface;

/// Record `audio_path` as PNG frames under `recording.frames_dir()`
///
/// Stops at the configured duration or when the audio ends, whichever comes
/// first. Returns the number of frames written.
pub fn record(
    audio_path: &Path,
    scene: &SceneConfig,
    render_config: &RenderConfig,
    recording: &RecordingConfig,
) -> Result<usize> {
    recording.validate()?;

    let audio = OfflineAudio::new(AnalyserConfig::default(), recording.fps)?;
    let mut driver = AnimationDriver::from_config(
        audio,
        RefreshScheduler::new(),
        scene,
        SpectrumMapping::default(),
    )?;
    let mut canvas = CanvasSurface::new(
        scene.canvas_width,
        scene.canvas_height,
        render_config.backdrop,
    )?;
    driver.draw_rest(&mut canvas);

    driver.on_decoded(load_file(audio_path))?;
    driver.start()?;

    std::fs::create_dir_all(recording.frames_dir())?;
    info!(
        "Recording up to {} frames @ {} FPS to {}",
        recording.total_frames(),
        recording.fps,
        recording.frames_dir().display()
    );

    let written = record_frames(&mut driver, &mut canvas, recording)?;
    driver.stop();
    Ok(written)
}

/// Drive a started animation frame by frame, saving each drawn frame
pub fn record_frames<A: AudioIngest, S: FrameScheduler>(
    driver: &mut AnimationDriver<A, S>,
    canvas: &mut CanvasSurface,
    recording: &RecordingConfig,
) -> Result<usize> {
    let total = recording.total_frames();
    let mut written = 0;

    for frame in 0..total {
        match driver.tick(canvas) {
            FrameOutcome::Drawn => {
                canvas.save_png(&recording.frame_path(frame))?;
                written += 1;
                if written % recording.fps as usize == 0 {
                    info!("Recorded {}/{} frames", written, total);
                }
            }
            FrameOutcome::Ended | FrameOutcome::NotDue => break,
        }
    }

    Ok(written)
}
