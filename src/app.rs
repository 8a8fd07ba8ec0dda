use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::{SimConfig, FACTOR_STEP, MIN_FACTOR, SPEED_STEP, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::error::AppError;
use crate::gpu::{GpuContext, RenderPipeline, SceneBuffers};
use crate::scene::{self, ShapeInstance};
use crate::simulation::{Command, FrameClock, Simulation, Stats};

/// Application state
pub struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    buffers: Option<SceneBuffers>,
    render_pipeline: Option<RenderPipeline>,
    sim: Simulation,
    clock: FrameClock,
    shapes: Vec<ShapeInstance>,
    frame_rate: FrameRate,
    fps: f64,
    title: String,
}

impl App {
    pub fn new(config: SimConfig) -> Self {
        Self {
            window: None,
            gpu: None,
            buffers: None,
            render_pipeline: None,
            sim: Simulation::new(config),
            clock: FrameClock::new(),
            shapes: Vec::new(),
            frame_rate: FrameRate::starting_at(Instant::now()),
            fps: 0.0,
            title: String::new(),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        log::info!("Initializing Galton cascade...");
        log::info!("Boxes: {}", self.sim.ladder().len());

        let window_attrs = Window::default_attributes()
            .with_title("Galton Cascade - Initializing...")
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        log::info!("Creating GPU context...");
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;

        let buffers = SceneBuffers::new(&gpu.device, &gpu.queue);
        let render_pipeline = RenderPipeline::new(&gpu.device, gpu.format());

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  R: Reset simulation");
        log::info!("  F: Step factor by {} (wraps at {})", FACTOR_STEP, self.sim.max_factor());
        log::info!("  1-4: Set factor");
        log::info!("  +/-: Speed up / slow down");
        log::info!("  Space: Pause/Resume");
        log::info!("  Escape: Quit");

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.buffers = Some(buffers);
        self.render_pipeline = Some(render_pipeline);
        self.clock.resync();
        Ok(())
    }

    fn render(&mut self) {
        // The delta is consumed every frame, paused or not, so resuming never
        // replays paused time
        let dt = self.clock.delta();
        self.sim.tick(dt);
        scene::build(&self.sim, &mut self.shapes);

        let (Some(gpu), Some(buffers), Some(render)) =
            (self.gpu.as_ref(), self.buffers.as_mut(), self.render_pipeline.as_ref())
        else {
            return;
        };

        buffers.upload(&gpu.device, &gpu.queue, &self.shapes);

        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        let bind_group =
            render.create_bind_group(&gpu.device, &buffers.instances, &buffers.screen_params);
        render.draw(&mut encoder, &view, &bind_group, buffers.len());

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(fps) = self.frame_rate.frame_presented(Instant::now()) {
            self.fps = fps;
        }
        self.update_title();
    }

    fn update_title(&mut self) {
        let title = format_title(&self.sim.stats(), self.fps);
        if title != self.title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.title = title;
        }
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        let command = match key_code {
            KeyCode::KeyR => Command::Reset,
            KeyCode::KeyF => Command::SetFactor(next_factor(self.sim.factor(), self.sim.max_factor())),
            KeyCode::Digit1 => Command::SetFactor(1.0),
            KeyCode::Digit2 => Command::SetFactor(2.0),
            KeyCode::Digit3 => Command::SetFactor(3.0),
            KeyCode::Digit4 => Command::SetFactor(4.0),
            KeyCode::Equal | KeyCode::NumpadAdd => Command::AdjustSpeed(SPEED_STEP),
            KeyCode::Minus | KeyCode::NumpadSubtract => Command::AdjustSpeed(-SPEED_STEP),
            KeyCode::Space => Command::TogglePause,
            _ => return,
        };

        self.sim.issue(command);
        if command == Command::TogglePause {
            self.clock.resync();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("Initialization failed: {}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                    gpu.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Factor after one press of the step key: up by FACTOR_STEP, back to the floor past the ceiling
fn next_factor(current: f32, max_factor: f32) -> f32 {
    let next = current + FACTOR_STEP;
    if next > max_factor + f32::EPSILON {
        MIN_FACTOR
    } else {
        next
    }
}

fn format_title(stats: &Stats, fps: f64) -> String {
    let mut title = format!(
        "Galton Cascade - States: {} | Steps: {} | Balls: {} | Factor: {:.2} | Cycles: {} | Speed: {:.1}x",
        stats.states, stats.steps, stats.balls, stats.factor, stats.cycles, stats.speed
    );
    if stats.dropped > 0 {
        title.push_str(&format!(" | Dropped: {}", stats.dropped));
    }
    if stats.paused {
        title.push_str(" | PAUSED");
    }
    title.push_str(&format!(" | {:.0} FPS", fps));
    title
}

/// Frame rate averaged over fixed sampling windows
struct FrameRate {
    window_start: Instant,
    frames: u32,
}

impl FrameRate {
    const WINDOW: Duration = Duration::from_secs(1);

    fn starting_at(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
        }
    }

    /// Count a presented frame; yields the rate once a window has closed
    fn frame_presented(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        let span = now.saturating_duration_since(self.window_start);
        if span < Self::WINDOW {
            return None;
        }

        let rate = f64::from(self.frames) / span.as_secs_f64();
        *self = Self::starting_at(now);
        Some(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_key_wraps() {
        assert_eq!(next_factor(1.0, 4.0), 1.5);
        assert_eq!(next_factor(3.5, 4.0), 4.0);
        assert_eq!(next_factor(4.0, 4.0), MIN_FACTOR);
        assert_eq!(next_factor(2.75, 3.0), MIN_FACTOR);
    }

    #[test]
    fn test_title_shows_pause() {
        let sim = Simulation::new(SimConfig {
            seed: Some(1),
            ..SimConfig::default()
        });
        let mut stats = sim.stats();
        let title = format_title(&stats, 60.0);
        assert!(title.contains("States: 20"));
        assert!(title.contains("Balls: 1"));
        assert!(!title.contains("PAUSED"));

        stats.paused = true;
        assert!(format_title(&stats, 60.0).contains("PAUSED"));
    }

    #[test]
    fn test_frame_rate_reports_once_per_window() {
        let start = Instant::now();
        let mut rate = FrameRate::starting_at(start);

        for frame in 1..60u64 {
            let now = start + Duration::from_millis(frame * 16);
            assert_eq!(rate.frame_presented(now), None);
        }
        let fps = rate
            .frame_presented(start + Duration::from_secs(1))
            .expect("window closed");
        assert!((fps - 60.0).abs() < 1e-9);

        // The next window starts from scratch
        assert_eq!(rate.frame_presented(start + Duration::from_millis(1100)), None);
    }
}
