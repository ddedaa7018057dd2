//! Magical Wave - layered rosettes that breathe with the music
//!
//! Play an audio file and watch three translucent rosettes pulse to its
//! spectrum, or record the animation frame by frame.

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use magical_wave::audio::{spawn_load, CpalAudio, DecodedAudio};
use magical_wave::cli::Args;
use magical_wave::params::{AnalyserConfig, RenderConfig, SceneConfig, SpectrumMapping};
use magical_wave::recording;
use magical_wave::rendering::Presenter;
use magical_wave::scheduler::RefreshScheduler;
use magical_wave::surface::CanvasSurface;
use magical_wave::{AnimationDriver, DriverState, FrameOutcome};

/// Main application state
struct App {
    // Window and presentation
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    canvas: CanvasSurface,

    // Animation
    driver: AnimationDriver<CpalAudio, RefreshScheduler>,

    /// Decode running in the background, if any
    loading: Option<mpsc::Receiver<magical_wave::Result<DecodedAudio>>>,

    /// File named on the command line, loaded once the window exists
    initial_audio: Option<PathBuf>,

    // Configuration
    scene: SceneConfig,
    render_config: RenderConfig,
}

impl App {
    fn new(args: &Args) -> anyhow::Result<Self> {
        let scene = args.scene_config()?;
        let render_config = args.render_config();

        let audio = CpalAudio::new(AnalyserConfig::default())?;
        let mut driver = AnimationDriver::from_config(
            audio,
            RefreshScheduler::new(),
            &scene,
            SpectrumMapping::default(),
        )?;
        let mut canvas = CanvasSurface::new(
            scene.canvas_width,
            scene.canvas_height,
            render_config.backdrop,
        )?;
        // Rosettes at rest until audio arrives
        driver.draw_rest(&mut canvas);

        Ok(Self {
            window: None,
            presenter: None,
            canvas,
            driver,
            loading: None,
            initial_audio: args.audio.clone(),
            scene,
            render_config,
        })
    }

    /// Start decoding `path` in the background
    fn load(&mut self, path: PathBuf) {
        if self.driver.state() != DriverState::Idle || self.loading.is_some() {
            warn!("Ignoring {}: audio already loaded", path.display());
            return;
        }
        info!("Loading {}", path.display());
        self.loading = Some(spawn_load(path));
    }

    /// Hand a finished decode to the driver and start playing
    fn poll_loading(&mut self) {
        let Some(receiver) = &self.loading else {
            return;
        };
        let decoded = match receiver.try_recv() {
            Ok(decoded) => decoded,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                self.loading = None;
                return;
            }
        };
        self.loading = None;

        if let Err(e) = self.driver.on_decoded(decoded) {
            // Stay idle: another file can be dropped
            warn!("Load failed: {}", e);
            return;
        }
        if let Err(e) = self.driver.start() {
            error!("Could not start playback: {}", e);
        }
    }

    /// Run the due frame (if any) and present the canvas
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        if self.driver.tick(&mut self.canvas) == FrameOutcome::Ended {
            println!("Playback finished. Drop another file to restart, ESC to quit.");
        }

        let Some(presenter) = &self.presenter else {
            return;
        };
        match presenter.present(self.canvas.data()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                presenter.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => warn!("Render error: {:?}", e),
        }
    }

    /// A stopped driver cannot be restarted; build a fresh one for a new file
    fn reset_if_stopped(&mut self) -> magical_wave::Result<()> {
        if self.driver.state() != DriverState::Stopped {
            return Ok(());
        }
        let audio = CpalAudio::new(AnalyserConfig::default())?;
        self.driver = AnimationDriver::from_config(
            audio,
            RefreshScheduler::new(),
            &self.scene,
            SpectrumMapping::default(),
        )?;
        self.driver.draw_rest(&mut self.canvas);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.poll_loading();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        // Create window
        let window_attributes = Window::default_attributes()
            .with_title(self.render_config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.scene.canvas_width,
                self.scene.canvas_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let presenter = match Presenter::new(
            Arc::clone(&window),
            self.scene.canvas_width,
            self.scene.canvas_height,
        ) {
            Ok(presenter) => presenter,
            Err(e) => {
                error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        println!("\nMagical Wave is running!");
        println!("Drop an audio file onto the window to play it");
        println!("Press SPACE or S to stop, ESC to quit\n");

        self.window = Some(window);
        self.presenter = Some(presenter);

        if let Some(path) = self.initial_audio.take() {
            self.load(path);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::Space | KeyCode::KeyS => self.driver.stop(),
                _ => {}
            },
            WindowEvent::DroppedFile(path) => {
                if let Err(e) = self.reset_if_stopped() {
                    error!("{}", e);
                    return;
                }
                self.load(path);
            }
            WindowEvent::Resized(size) => {
                if let Some(presenter) = &mut self.presenter {
                    presenter.resize(size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render_frame(event_loop);
            }
            _ => {}
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.driver.stop();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Magical Wave - audio-reactive rosettes");

    if let Some(recording) = args.recording_config()? {
        let scene = args.scene_config()?;
        let audio_path = args
            .audio
            .as_deref()
            .context("recording needs an audio file")?;
        println!(
            "Recording {} frames @ {} FPS to {}",
            recording.total_frames(),
            recording.fps,
            recording.frames_dir().display()
        );
        let written = recording::record(audio_path, &scene, &args.render_config(), &recording)
            .with_context(|| format!("recording {}", audio_path.display()))?;
        println!("Recorded {} frames", written);
        return Ok(());
    }

    println!("Initializing systems...\n");
    let mut app = App::new(&args)?;
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;
    Ok(())
}
