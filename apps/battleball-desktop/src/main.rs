mod config;
mod driver;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use battleball_common::LogicalSize;
use battleball_input::{Direction, FallbackSensor, NoSensor, SensorSampler, SimulatedAccelerometer};
use battleball_render::{FrameScheduler, RenderContext, SchedulerState, SphereScene, SurfaceSpec};
use battleball_render_wgpu::{SPHERE_SHADER, WgpuBackend};
use battleball_session::{LoopbackTransport, SessionClient};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::ClientConfig;
use crate::driver::InputDriver;

#[derive(Parser)]
#[command(name = "battleball-desktop", about = "Battleball desktop client")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sphere radius
    #[arg(long)]
    radius: Option<f32>,

    /// Sphere latitude/longitude segments
    #[arg(long)]
    segments: Option<u32>,

    /// Room to join
    #[arg(long)]
    room: Option<String>,

    /// Player name announced to the room
    #[arg(long)]
    name: Option<String>,

    /// Consecutive failed frames before rendering halts (0 = never)
    #[arg(long)]
    max_failures: Option<u32>,

    /// Skip joining a room
    #[arg(long)]
    offline: bool,
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        if let Some(radius) = self.radius {
            config.render.sphere.radius = radius;
        }
        if let Some(segments) = self.segments {
            config.render.sphere.segments = segments;
        }
        if let Some(room) = &self.room {
            config.session.room = room.clone();
        }
        if let Some(name) = &self.name {
            config.session.player_name = name.clone();
        }
        if let Some(max) = self.max_failures {
            config.render.max_consecutive_failures = max;
        }
        Ok(config)
    }
}

fn direction_for(key: KeyCode) -> Option<Direction> {
    match key {
        KeyCode::ArrowUp => Some(Direction::Up),
        KeyCode::ArrowDown => Some(Direction::Down),
        KeyCode::ArrowLeft => Some(Direction::Left),
        KeyCode::ArrowRight => Some(Direction::Right),
        _ => None,
    }
}

fn surface_spec(window: &Window) -> SurfaceSpec {
    let scale_factor = window.scale_factor();
    let logical = window.inner_size().to_logical::<f64>(scale_factor);
    SurfaceSpec::new(LogicalSize::new(logical.width, logical.height), scale_factor)
}

/// Desktops have no accelerometer, so motion always ends up simulated.
type MotionSensor = FallbackSensor<NoSensor, SimulatedAccelerometer>;

struct App {
    config: ClientConfig,
    window: Option<Arc<Window>>,
    scheduler: FrameScheduler<SphereScene<WgpuBackend>>,
    input: InputDriver<MotionSensor, LoopbackTransport>,
    last_frame: Instant,
}

impl App {
    fn new(config: ClientConfig, offline: bool) -> Self {
        let now = Instant::now();
        let mut session = SessionClient::new(LoopbackTransport::new());
        if !offline {
            tracing::info!(
                endpoint = %config.session.endpoint,
                "no network transport in this build, joining loopback room"
            );
            if let Err(e) = session.join_or_create(&config.session.room, &config.session.player_name) {
                tracing::warn!("continuing offline: {e}");
            }
        }
        let sampler = SensorSampler::new(FallbackSensor::new(
            NoSensor,
            SimulatedAccelerometer::new(now),
        ));

        Self {
            scheduler: FrameScheduler::uninitialized(config.render.max_consecutive_failures),
            input: InputDriver::new(sampler, session, config.render.spin_rate),
            config,
            window: None,
            last_frame: now,
        }
    }

    fn setup_renderer(&mut self, window: &Arc<Window>) {
        let _span = tracing::info_span!("render_setup").entered();
        let backend = match WgpuBackend::new(window.clone()) {
            Ok(backend) => backend,
            Err(e) => {
                tracing::error!("render setup failed: {e}");
                return;
            }
        };
        let setup = RenderContext::initialize(
            backend,
            surface_spec(window),
            &self.config.render,
            SPHERE_SHADER,
        );
        match pollster::block_on(setup) {
            Ok(context) => {
                self.scheduler.attach(SphereScene::new(context));
                if self.scheduler.start() {
                    window.request_redraw();
                }
            }
            Err(e) => tracing::error!("render setup failed, window left blank: {e}"),
        }
    }

    fn toggle_sensor(&mut self) {
        let active = self.input.toggle_sensor();
        tracing::info!(
            active,
            simulated = self.input.sampler().source().is_simulated(),
            "motion sensor toggled"
        );
    }

    fn toggle_pause(&mut self) {
        match self.scheduler.state() {
            SchedulerState::Rendering => {
                self.scheduler.stop();
                tracing::info!("rendering paused");
            }
            SchedulerState::Stopped => {
                if self.scheduler.start() {
                    self.last_frame = Instant::now();
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame);
        self.last_frame = now;

        let angle = self.input.update(now, dt);
        if let Some(scene) = self.scheduler.renderer_mut() {
            scene.set_rotation(angle);
        }

        let outcome = self.scheduler.tick();
        if outcome.should_reschedule() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        } else if self.scheduler.state() == SchedulerState::Failed {
            let stats = self.scheduler.stats();
            tracing::error!(
                frames = stats.frames,
                failures = stats.failures,
                "render loop stopped after repeated failures"
            );
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Battleball")
            .with_inner_size(PhysicalSize::new(720u32, 1280));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        self.setup_renderer(&window);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.scheduler.stop();
                self.input.session_mut().leave(1000);
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                let Some(window) = &self.window else {
                    return;
                };
                let spec = surface_spec(window);
                if let Some(scene) = self.scheduler.renderer_mut() {
                    if let Err(e) = scene.resize(spec) {
                        tracing::debug!("resize skipped: {e}");
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                if let Some(direction) = direction_for(key) {
                    if pressed && !repeat {
                        self.input.press(direction, Instant::now());
                    } else if !pressed {
                        self.input.release(direction);
                    }
                } else if pressed && !repeat {
                    match key {
                        KeyCode::Space => self.toggle_pause(),
                        KeyCode::KeyT => self.toggle_sensor(),
                        _ => {}
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.client_config()?;
    tracing::info!(
        radius = config.render.sphere.radius,
        segments = config.render.sphere.segments,
        room = %config.session.room,
        "battleball-desktop starting"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, cli.offline);
    event_loop.run_app(&mut app)?;

    Ok(())
}
