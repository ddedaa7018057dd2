//! Animation driver: ties playback state to the per-frame rosette update.

use log::{error, info};

use crate::audio::AudioIngest;
use crate::error::{Result, SceneError};
use crate::params::{SceneConfig, SpectrumMapping};
use crate::rosette::{layered_rosettes, RosetteGeometry};
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::spectrum::{compute_scale_factors, downsample};
use crate::surface::Surface;

/// Playback/animation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No audio loaded
    Idle,
    /// Audio decoded, not started
    Ready,
    /// Playing, one frame scheduled at a time
    Running,
    /// Playback and scheduling ended for good
    Stopped,
}

/// Result of offering a refresh to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No frame of ours was due
    NotDue,
    /// A frame was drawn and the next one scheduled
    Drawn,
    /// Playback finished; the driver stopped instead of drawing
    Ended,
}

/// Drives the rosettes from the audio spectrum, one scheduled frame at a time
pub struct AnimationDriver<A: AudioIngest, S: FrameScheduler> {
    audio: A,
    scheduler: S,
    rosettes: Vec<RosetteGeometry>,
    mapping: SpectrumMapping,
    /// Area cleared before each frame (pixels)
    canvas_size: (f64, f64),
    state: DriverState,
    decoded: Option<A::Buffer>,
    pending: Option<FrameHandle>,
    frames_drawn: u64,
}

impl<A: AudioIngest, S: FrameScheduler> AnimationDriver<A, S> {
    pub fn new(
        audio: A,
        scheduler: S,
        rosettes: Vec<RosetteGeometry>,
        mapping: SpectrumMapping,
        canvas_size: (f64, f64),
    ) -> Result<Self> {
        mapping.validate()?;
        Ok(Self {
            audio,
            scheduler,
            rosettes,
            mapping,
            canvas_size,
            state: DriverState::Idle,
            decoded: None,
            pending: None,
            frames_drawn: 0,
        })
    }

    /// Driver for the layered rosette scene described by `scene`
    pub fn from_config(
        audio: A,
        scheduler: S,
        scene: &SceneConfig,
        mapping: SpectrumMapping,
    ) -> Result<Self> {
        let rosettes = layered_rosettes(scene)?;
        let canvas_size = (scene.canvas_width as f64, scene.canvas_height as f64);
        Self::new(audio, scheduler, rosettes, mapping, canvas_size)
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn rosettes(&self) -> &[RosetteGeometry] {
        &self.rosettes
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Frames drawn since construction
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    fn expect_state(&self, expected: DriverState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SceneError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Decode the selected file's bytes (Idle → Ready)
    pub fn load(&mut self, bytes: &[u8]) -> Result<()> {
        self.expect_state(DriverState::Idle, "load audio")?;
        let decoded = self.audio.decode(bytes);
        self.on_decoded(decoded)
    }

    /// Accept the outcome of a decode performed elsewhere (Idle → Ready on success)
    ///
    /// A failed decode leaves the driver Idle so another file can be tried.
    pub fn on_decoded(&mut self, decoded: Result<A::Buffer>) -> Result<()> {
        self.expect_state(DriverState::Idle, "accept decoded audio")?;
        match decoded {
            Ok(buffer) => {
                self.decoded = Some(buffer);
                self.state = DriverState::Ready;
                info!("Audio decoded, ready to play");
                Ok(())
            }
            Err(e) => {
                error!("Audio could not be decoded: {}", e);
                Err(e)
            }
        }
    }

    /// Start playback and the frame loop (Ready → Running)
    pub fn start(&mut self) -> Result<()> {
        self.expect_state(DriverState::Ready, "start")?;
        let Some(buffer) = self.decoded.take() else {
            self.state = DriverState::Idle;
            return Err(SceneError::InvalidState {
                operation: "start",
                state: DriverState::Idle,
            });
        };

        if let Err(e) = self.audio.connect_and_start(buffer) {
            error!("Playback failed to start: {}", e);
            self.state = DriverState::Idle;
            return Err(e);
        }

        self.pending = Some(self.scheduler.schedule_next_frame());
        self.state = DriverState::Running;
        info!("Animation running ({} rosettes)", self.rosettes.len());
        Ok(())
    }

    /// Decode then start
    pub fn run(&mut self, bytes: &[u8]) -> Result<()> {
        self.load(bytes)?;
        self.start()
    }

    /// End playback and cancel the scheduled frame (Ready/Running → Stopped)
    pub fn stop(&mut self) {
        match self.state {
            DriverState::Idle | DriverState::Stopped => return,
            DriverState::Ready => {
                self.decoded = None;
            }
            DriverState::Running => {
                self.audio.stop();
                if let Some(handle) = self.pending.take() {
                    self.scheduler.cancel(handle);
                }
            }
        }
        self.state = DriverState::Stopped;
        info!("Animation stopped after {} frames", self.frames_drawn);
    }

    /// Run the due frame, if it is ours
    pub fn tick<T: Surface + ?Sized>(&mut self, surface: &mut T) -> FrameOutcome {
        let Some(handle) = self.scheduler.take_due() else {
            return FrameOutcome::NotDue;
        };
        if self.state != DriverState::Running || self.pending != Some(handle) {
            return FrameOutcome::NotDue;
        }
        self.pending = None;

        if self.audio.has_ended() {
            info!("Playback ended");
            self.stop();
            return FrameOutcome::Ended;
        }

        self.step(surface);
        self.pending = Some(self.scheduler.schedule_next_frame());
        FrameOutcome::Drawn
    }

    /// Clear and draw every rosette at its rest shape
    ///
    /// Shows the scene before any audio plays; allowed in every state.
    pub fn draw_rest<T: Surface + ?Sized>(&mut self, surface: &mut T) {
        let (width, height) = self.canvas_size;
        surface.clear_rect(0.0, 0.0, width, height);

        for rosette in &mut self.rosettes {
            let rest = vec![self.mapping.min_scale; rosette.vertex_count()];
            rosette.update(&rest);
            rosette.render(surface);
        }
    }

    /// Clear, sample the spectrum, then update and draw every rosette
    fn step<T: Surface + ?Sized>(&mut self, surface: &mut T) {
        let (width, height) = self.canvas_size;
        surface.clear_rect(0.0, 0.0, width, height);

        let bands = downsample(
            self.audio.current_frequency_magnitudes(),
            self.mapping.downsample_factor,
        );

        for rosette in &mut self.rosettes {
            let scale = compute_scale_factors(&bands, rosette.vertex_count(), &self.mapping);
            rosette.update(&scale);
            rosette.render(surface);
        }

        self.frames_drawn += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::RefreshScheduler;
    use crate::surface::Color;
    use glam::DVec2;

    #[derive(Default)]
    struct FakeAudio {
        magnitudes: Vec<u8>,
        started: usize,
        stopped: usize,
        ended: bool,
        fail_start: bool,
    }

    impl AudioIngest for FakeAudio {
        type Buffer = Vec<u8>;

        fn decode(&mut self, bytes: &[u8]) -> Result<Vec<u8>> {
            if bytes.starts_with(b"RIFF") {
                Ok(bytes.to_vec())
            } else {
                Err(SceneError::Decode("not a RIFF file".to_string()))
            }
        }

        fn connect_and_start(&mut self, _buffer: Vec<u8>) -> Result<()> {
            if self.fail_start {
                return Err(SceneError::Playback("no device".to_string()));
            }
            self.started += 1;
            Ok(())
        }

        fn stop(&mut self) {
            self.stopped += 1;
        }

        fn current_frequency_magnitudes(&mut self) -> &[u8] {
            &self.magnitudes
        }

        fn has_ended(&self) -> bool {
            self.ended
        }
    }

    #[derive(Default)]
    struct SpyScheduler {
        inner: RefreshScheduler,
        cancelled: Vec<FrameHandle>,
    }

    impl FrameScheduler for SpyScheduler {
        fn schedule_next_frame(&mut self) -> FrameHandle {
            self.inner.schedule_next_frame()
        }

        fn cancel(&mut self, handle: FrameHandle) {
            self.cancelled.push(handle);
            self.inner.cancel(handle);
        }

        fn take_due(&mut self) -> Option<FrameHandle> {
            self.inner.take_due()
        }
    }

    /// Counts surface calls
    #[derive(Default)]
    struct CountingSurface {
        clears: usize,
        fills: usize,
        calls: usize,
    }

    impl Surface for CountingSurface {
        fn clear_rect(&mut self, _: f64, _: f64, _: f64, _: f64) {
            self.clears += 1;
            self.calls += 1;
        }
        fn begin_path(&mut self) {
            self.calls += 1;
        }
        fn move_to(&mut self, _: DVec2) {
            self.calls += 1;
        }
        fn line_to(&mut self, _: DVec2) {
            self.calls += 1;
        }
        fn bezier_curve_to(&mut self, _: DVec2, _: DVec2, _: DVec2) {
            self.calls += 1;
        }
        fn close_path(&mut self) {
            self.calls += 1;
        }
        fn set_fill_style(&mut self, _: Color) {
            self.calls += 1;
        }
        fn fill(&mut self) {
            self.fills += 1;
            self.calls += 1;
        }
    }

    fn scene() -> SceneConfig {
        SceneConfig {
            canvas_width: 200,
            canvas_height: 200,
            petal_count: 8,
            ..SceneConfig::default()
        }
    }

    fn driver(audio: FakeAudio) -> AnimationDriver<FakeAudio, SpyScheduler> {
        AnimationDriver::from_config(
            audio,
            SpyScheduler::default(),
            &scene(),
            SpectrumMapping::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_load_moves_idle_to_ready() {
        let mut driver = driver(FakeAudio::default());
        assert_eq!(driver.state(), DriverState::Idle);

        driver.load(b"RIFF....").unwrap();
        assert_eq!(driver.state(), DriverState::Ready);

        // A second file cannot replace the loaded one
        assert!(matches!(
            driver.load(b"RIFF...."),
            Err(SceneError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_decode_failure_stays_idle() {
        let mut driver = driver(FakeAudio::default());
        assert!(matches!(driver.load(b"MP3?"), Err(SceneError::Decode(_))));
        assert_eq!(driver.state(), DriverState::Idle);

        // Retry with another file works
        driver.run(b"RIFF").unwrap();
        assert_eq!(driver.state(), DriverState::Running);
    }

    #[test]
    fn test_io_failure_reported_through_on_decoded() {
        let mut driver = driver(FakeAudio::default());
        let failed = Err(SceneError::Io(std::io::Error::from(
            std::io::ErrorKind::NotFound,
        )));
        assert!(matches!(driver.on_decoded(failed), Err(SceneError::Io(_))));
        assert_eq!(driver.state(), DriverState::Idle);
    }

    #[test]
    fn test_start_requires_ready() {
        let mut driver = driver(FakeAudio::default());
        assert!(matches!(
            driver.start(),
            Err(SceneError::InvalidState {
                state: DriverState::Idle,
                ..
            })
        ));
    }

    #[test]
    fn test_playback_failure_returns_to_idle() {
        let mut driver = driver(FakeAudio {
            fail_start: true,
            ..FakeAudio::default()
        });
        assert!(matches!(driver.run(b"RIFF"), Err(SceneError::Playback(_))));
        assert_eq!(driver.state(), DriverState::Idle);
        assert!(!driver.scheduler().inner.is_pending());
    }

    #[test]
    fn test_run_starts_audio_and_schedules_frame() {
        let mut driver = driver(FakeAudio::default());
        driver.run(b"RIFF").unwrap();

        assert_eq!(driver.state(), DriverState::Running);
        assert_eq!(driver.audio().started, 1);
        assert!(driver.scheduler().inner.is_pending());
    }

    #[test]
    fn test_tick_draws_each_rosette_after_clear() {
        let mut driver = driver(FakeAudio {
            magnitudes: vec![128; 1024],
            ..FakeAudio::default()
        });
        let mut surface = CountingSurface::default();

        // Nothing scheduled before start
        assert_eq!(driver.tick(&mut surface), FrameOutcome::NotDue);
        assert_eq!(surface.calls, 0);

        driver.run(b"RIFF").unwrap();
        assert_eq!(driver.tick(&mut surface), FrameOutcome::Drawn);
        assert_eq!(surface.clears, 1);
        assert_eq!(surface.fills, 3);

        assert_eq!(driver.tick(&mut surface), FrameOutcome::Drawn);
        assert_eq!(surface.clears, 2);
        assert_eq!(driver.frames_drawn(), 2);
    }

    #[test]
    fn test_loud_spectrum_pushes_vertices_outward() {
        let mut driver = driver(FakeAudio {
            magnitudes: vec![255; 1024],
            ..FakeAudio::default()
        });
        let rest: Vec<DVec2> = driver.rosettes()[0].display_vertices().to_vec();
        let pole = driver.rosettes()[0].pole();

        driver.run(b"RIFF").unwrap();
        driver.tick(&mut CountingSurface::default());

        let shown = driver.rosettes()[0].display_vertices();
        for (now, before) in shown.iter().zip(&rest) {
            let ratio = now.distance(pole) / before.distance(pole);
            assert!((ratio - 1.15).abs() < 1e-9, "ratio {}", ratio);
        }
    }

    #[test]
    fn test_stop_cancels_pending_frame() {
        let mut driver = driver(FakeAudio {
            magnitudes: vec![64; 1024],
            ..FakeAudio::default()
        });
        driver.run(b"RIFF").unwrap();
        let mut surface = CountingSurface::default();
        driver.tick(&mut surface);
        let calls_before_stop = surface.calls;

        driver.stop();

        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(driver.audio().stopped, 1);
        assert_eq!(driver.scheduler().cancelled.len(), 1);
        for _ in 0..3 {
            assert_eq!(driver.tick(&mut surface), FrameOutcome::NotDue);
        }
        assert_eq!(surface.calls, calls_before_stop);

        // Stopped is terminal
        driver.stop();
        assert_eq!(driver.audio().stopped, 1);
        assert!(driver.run(b"RIFF").is_err());
    }

    #[test]
    fn test_playback_end_stops_driver() {
        let mut driver = driver(FakeAudio::default());
        driver.run(b"RIFF").unwrap();
        driver.audio.ended = true;

        let mut surface = CountingSurface::default();
        assert_eq!(driver.tick(&mut surface), FrameOutcome::Ended);
        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(driver.audio().stopped, 1);
        assert_eq!(surface.calls, 0);
        assert_eq!(driver.tick(&mut surface), FrameOutcome::NotDue);
    }

    #[test]
    fn test_rest_draw_while_idle() {
        let mut driver = driver(FakeAudio::default());
        let mut surface = CountingSurface::default();

        driver.draw_rest(&mut surface);

        assert_eq!(surface.clears, 1);
        assert_eq!(surface.fills, 3);
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(driver.frames_drawn(), 0);
        // Drawing at rest does not schedule frames
        assert_eq!(driver.tick(&mut surface), FrameOutcome::NotDue);
    }

    #[test]
    fn test_rest_draw_restores_base_shape() {
        let mut driver = driver(FakeAudio {
            magnitudes: vec![255; 1024],
            ..FakeAudio::default()
        });
        driver.run(b"RIFF").unwrap();
        driver.tick(&mut CountingSurface::default());
        driver.stop();

        driver.draw_rest(&mut CountingSurface::default());
        let rosette = &driver.rosettes()[0];
        for (shown, &base) in rosette.display_vertices().iter().zip(rosette.base_vertices()) {
            assert!(shown.distance(rosette.pole() + base) < 1e-9);
        }
    }

    #[test]
    fn test_stop_before_start() {
        let mut driver = driver(FakeAudio::default());
        driver.stop();
        assert_eq!(driver.state(), DriverState::Idle);

        driver.load(b"RIFF").unwrap();
        driver.stop();
        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(driver.audio().stopped, 0);
    }
}
