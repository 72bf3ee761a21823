//! icopulse - An audio-reactive wireframe icosphere
//!
//! A subdivided icosahedron breathes along its normals in time with the
//! low end of a looping track.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use icopulse::audio::{AudioClip, AudioError, AudioReactor};
use icopulse::cli::Args;
use icopulse::driver::{AnimationDriver, TickOutcome};
use icopulse::params::{AudioConfig, RenderConfig, ShapeParams};
use icopulse::rendering::RenderSystem;
use icopulse::shape::IcosphereMesh;

/// Events posted to the window loop from other threads
enum AudioEvent {
    Loaded(Result<AudioClip, AudioError>),
}

/// Rendered-frame counter, logged once per second
struct FrameStats {
    window_start: Instant,
    frames: u32,
    last_magnitude: f32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            last_magnitude: 0.0,
        }
    }

    fn record(&mut self, magnitude: f32) {
        self.frames += 1;
        self.last_magnitude = magnitude;

        let elapsed = self.window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            log::debug!(
                "{:.1} ticks/s, magnitude {:.0}",
                self.frames as f32 / elapsed.as_secs_f32(),
                self.last_magnitude
            );
            self.frames = 0;
            self.window_start = Instant::now();
        }
    }
}

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    mesh: IcosphereMesh,

    // Audio and animation
    reactor: Option<AudioReactor>,
    driver: AnimationDriver,
    stats: FrameStats,

    // Configuration
    render_config: RenderConfig,
    shape_params: ShapeParams,
    audio_config: AudioConfig,
}

impl App {
    fn new(render_config: RenderConfig, audio_config: AudioConfig) -> Self {
        let shape_params = ShapeParams::default();
        let mesh = IcosphereMesh::new(&shape_params);
        log::info!(
            "Icosphere: {} vertices, {} edges, {} triangles",
            mesh.vertices.len(),
            mesh.edge_count(),
            mesh.triangle_count()
        );

        Self {
            window: None,
            render_system: None,
            mesh,
            reactor: None,
            driver: AnimationDriver::new(&shape_params),
            stats: FrameStats::new(),
            render_config,
            shape_params,
            audio_config,
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.driver.stop();
        event_loop.exit();
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Run one animation tick, or draw the still frame while audio loads
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };

        let result = match self.reactor.as_mut() {
            Some(reactor) => self.driver.tick(reactor, render_system),
            None => self
                .driver
                .render_still(render_system)
                .map(|_| TickOutcome::Idle),
        };

        match result {
            Ok(TickOutcome::Rendered { magnitude }) => self.stats.record(magnitude),
            Ok(TickOutcome::Idle) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                render_system.reconfigure();
                self.request_redraw();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                self.shutdown(event_loop);
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler<AudioEvent> for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Until audio plays, frames are drawn only when the window asks
        if self.driver.wants_continuous_redraw() {
            self.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title("icopulse")
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &self.mesh,
            &self.render_config,
            &self.shape_params,
        ));

        match render_system {
            Ok(render_system) => {
                self.render_system = Some(render_system);
                window.request_redraw();
                self.window = Some(window);
                log::info!("Press ESC to quit");
            }
            Err(e) => {
                log::error!("Failed to initialize renderer: {}", e);
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AudioEvent) {
        match event {
            AudioEvent::Loaded(Ok(clip)) => match AudioReactor::start(clip, &self.audio_config) {
                Ok(reactor) => {
                    self.reactor = Some(reactor);
                    self.driver.on_audio_ready();
                    log::info!("Audio playing, animation started");
                }
                Err(e) => log::error!("Failed to start audio playback: {}", e),
            },
            AudioEvent::Loaded(Err(e)) => {
                log::error!(
                    "Failed to load {}: {}",
                    self.audio_config.asset_path.display(),
                    e
                );
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                    self.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let render_config = args.render_config();
    let audio_config = args.audio_config();
    audio_config.validate()?;

    let event_loop = EventLoop::<AudioEvent>::with_user_event()
        .build()
        .context("Failed to create event loop")?;

    let proxy = event_loop.create_proxy();
    AudioReactor::spawn_loader(audio_config.asset_path.clone(), move |result| {
        // Fails only if the loop already exited
        let _ = proxy.send_event(AudioEvent::Loaded(result));
    });

    let mut app = App::new(render_config, audio_config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
