//! Orrery - animated sun, planets, rings and moons
//!
//! Nine bodies circle a textured sun against a star field. Each planet spins
//! about its own axis and rides an invisible pivot around the origin; Saturn
//! and Uranus carry rings, Earth carries the Moon.
//!
//! Controls:
//! - Left drag: Orbit camera
//! - Right drag: Pan camera
//! - Scroll: Zoom
//! - Space: Pause/resume
//! - +/-: Time scale
//! - R: Reset camera
//! - Escape: Quit

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use common::{Camera3D, GraphicsContext};
use glam::Vec3;
use winit::{
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

use orrery::cli::CliArgs;
use orrery::config::{Config, ControlsConfig, DEFAULT_CONFIG_FILE};
use orrery::error::OrreryError;
use orrery::renderer::Renderer;
use orrery::scene::{phase_rng, Animation, Scene};
use orrery::solar_system::SOLAR_SYSTEM;

struct App {
    ctx: GraphicsContext,
    renderer: Renderer,
    scene: Scene,
    camera: Camera3D,
    home: (Vec3, Vec3),
    controls: ControlsConfig,

    // Input state
    rotating: bool,
    panning: bool,
    last_mouse_pos: Option<(f64, f64)>,

    animation: Animation,
}

impl App {
    fn new(ctx: GraphicsContext, config: &Config) -> Self {
        let mut rng = phase_rng(config.animation.seed);
        let scene = Scene::build(&SOLAR_SYSTEM, &mut rng);
        let renderer = Renderer::new(&ctx, &SOLAR_SYSTEM, &scene, &config.lighting, &config.assets);

        let mut camera = Camera3D::new(ctx.aspect_ratio());
        camera.fov = config.camera.fov_degrees.to_radians();
        camera.near = config.camera.near;
        camera.far = config.camera.far;
        camera.max_distance = camera.far * 0.9;
        let home = (Vec3::from(config.camera.position), Vec3::from(config.camera.target));
        camera.look_from(home.0, home.1);

        Self {
            ctx,
            renderer,
            scene,
            camera,
            home,
            controls: config.controls.clone(),
            rotating: false,
            panning: false,
            last_mouse_pos: None,
            animation: Animation::new(config.animation.time_scale, config.animation.paused),
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if !self.ctx.resize(new_size) {
            log::debug!("Window minimised; keeping {}x{}", self.ctx.size.width, self.ctx.size.height);
            return;
        }
        self.camera.update_aspect_ratio(self.ctx.aspect_ratio());
        self.renderer
            .resize(&self.ctx.device, self.ctx.config.width, self.ctx.config.height);
        log::debug!("Resized to {}x{}", new_size.width, new_size.height);
    }

    fn update(&mut self) {
        self.animation.update(&mut self.scene);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.update(&self.ctx.queue, &self.camera, &self.scene);

        let mut encoder = self.ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        self.renderer.render(&mut encoder, &view);

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Returns false when the app should quit
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Escape => return false,
            KeyCode::Space => {
                let paused = self.animation.toggle_pause();
                log::info!("{}", if paused { "Paused" } else { "Resumed" });
            }
            KeyCode::Equal | KeyCode::NumpadAdd => {
                log::info!("Time scale: {:.2}x", self.animation.speed_up());
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                log::info!("Time scale: {:.4}x", self.animation.slow_down());
            }
            KeyCode::KeyR => {
                self.camera.look_from(self.home.0, self.home.1);
                log::info!("Camera reset");
            }
            _ => {}
        }
        true
    }

    fn handle_mouse_move(&mut self, x: f64, y: f64) {
        if let Some((last_x, last_y)) = self.last_mouse_pos {
            let dx = (x - last_x) as f32;
            let dy = (y - last_y) as f32;
            if self.rotating {
                // Dragging right swings the eye left around the target
                self.camera.orbit(-dx * self.controls.rotate_speed, dy * self.controls.rotate_speed);
            } else if self.panning {
                let scale = self.camera.distance * self.controls.pan_speed;
                self.camera.pan(-dx * scale, dy * scale);
            }
        }
        self.last_mouse_pos = if self.rotating || self.panning {
            Some((x, y))
        } else {
            None
        };
    }

    fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.rotating = pressed,
            MouseButton::Right => self.panning = pressed,
            _ => {}
        }
        if !self.rotating && !self.panning {
            self.last_mouse_pos = None;
        }
    }

    fn handle_scroll(&mut self, delta: f32) {
        self.camera.zoom(delta * self.camera.distance * self.controls.zoom_speed);
    }
}

fn init_logging(filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .init();
}

fn load_config(args: &CliArgs) -> Result<Config, OrreryError> {
    let mut config = Config::resolve(args.config.as_deref(), Path::new(DEFAULT_CONFIG_FILE))?;
    config.apply_cli_overrides(args)?;
    Ok(config)
}

fn run(config: Config) -> Result<(), OrreryError> {
    log::info!("Controls: left drag orbit | right drag pan | scroll zoom | space pause | +/- time scale | R reset | Esc quit");
    log::info!("Loading textures from {}", config.assets.display());

    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        &config.window.title,
        config.window.width,
        config.window.height,
        config.window.vsync,
    ))?;

    let mut app = App::new(ctx, &config);
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(size) => app.resize(size),
                WindowEvent::MouseInput { state, button, .. } => {
                    app.handle_mouse_button(button, state == ElementState::Pressed);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    app.handle_mouse_move(position.x, position.y);
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(key),
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                } => {
                    if !app.handle_key(key) {
                        elwt.exit();
                    }
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    let scroll = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                    };
                    app.handle_scroll(scroll);
                }
                WindowEvent::RedrawRequested => {
                    app.update();

                    match app.render() {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => app.resize(app.ctx.size),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("GPU out of memory");
                            elwt.exit();
                        }
                        Err(e) => log::warn!("Render error: {e:?}"),
                    }

                    // FPS counter
                    frame_count += 1;
                    if fps_timer.elapsed().as_secs_f32() >= 2.0 {
                        let fps = frame_count as f32 / fps_timer.elapsed().as_secs_f32();
                        log::info!(
                            "FPS: {:.1} | Frame: {} | Time scale: {:.2}x{}",
                            fps,
                            app.scene.frames(),
                            app.animation.time_scale(),
                            if app.animation.paused() { " (paused)" } else { "" }
                        );
                        frame_count = 0;
                        fps_timer = Instant::now();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                app.ctx.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&Config::default().log_level);
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if args.dump_config {
        return match config.to_ron() {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                init_logging(&config.log_level);
                log::error!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    init_logging(&config.log_level);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
