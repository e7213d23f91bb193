use glam::{Vec2, Vec3};
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::camera::{Camera, OrbitControls};
use crate::config::{
    DriverConfig, FieldConfig, SimulationConfig, TrailConfig, MAX_CONTRIBUTORS, SPEED_STEP,
    TRAIL_PLANE_Z,
};
use crate::gpu::{GpuContext, RenderResult, SceneParams, VolumeBuffers, VolumePipeline};
use crate::simulation::{unproject_pointer, AnimationDriver, ContributorBatch, FrameOutcome, SimulationState};

/// GPU resources acquired on resume and released on close
struct Renderer {
    gpu: GpuContext,
    buffers: VolumeBuffers,
    pipeline: VolumePipeline,
}

/// Application state
pub struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    driver: AnimationDriver,
    batch: ContributorBatch,
    camera: Camera,
    orbit: OrbitControls,
    cursor: Option<Vec2>,
    left_drag: bool,
    right_drag: bool,
    middle_drag: bool,
    start: Instant,
}

impl App {
    pub fn new() -> Self {
        let field = FieldConfig::default();
        let mut rng = rand::rngs::StdRng::from_entropy();
        let state = SimulationState::new(&SimulationConfig::default(), field.satellites, &mut rng);
        log::debug!(
            "Simulation starts at t={:.2} with phase offsets {:?}",
            state.time,
            state.phase_offsets
        );

        Self {
            window: None,
            renderer: None,
            driver: AnimationDriver::new(DriverConfig::default(), field, TrailConfig::default(), state),
            batch: ContributorBatch::with_capacity(MAX_CONTRIBUTORS),
            camera: Camera::new(1.0),
            orbit: OrbitControls::default(),
            cursor: None,
            left_drag: false,
            right_drag: false,
            middle_drag: false,
            start: Instant::now(),
        }
    }

    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> RenderResult<()> {
        log::info!("Initializing lava lamp...");

        let window_attrs = Window::default_attributes()
            .with_title("Lava Lamp - Initializing...")
            .with_inner_size(winit::dpi::LogicalSize::new(900, 900));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        log::info!("Creating GPU context...");
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;
        let (width, height) = gpu.size();
        self.camera.set_aspect(width, height);

        log::info!("Creating volume buffers and ray-march pipeline...");
        let buffers = VolumeBuffers::new(&gpu.device);
        let pipeline = VolumePipeline::new(&gpu.device, gpu.format(), &buffers);

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  Left drag: Cut through the lava");
        log::info!("  Right drag: Orbit camera");
        log::info!("  Middle drag: Pan camera");
        log::info!("  Space: Pause/resume");
        log::info!("  [/]: Slower/faster");
        log::info!("  R: Reset trail and view");
        log::info!("  Escape: Quit");

        self.window = Some(window);
        self.renderer = Some(Renderer {
            gpu,
            buffers,
            pipeline,
        });
        Ok(())
    }

    fn release(&mut self) {
        if self.renderer.take().is_some() {
            log::info!("Released GPU resources");
        }
        self.window = None;
    }

    fn render(&mut self) {
        let now = self.now();
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        let report = self.driver.tick(now, &mut self.batch);
        self.orbit.update(&mut self.camera);

        let gpu = &renderer.gpu;
        if let FrameOutcome::Generated { .. } = report.frame {
            renderer.buffers.upload_batch(&gpu.queue, &self.batch);
        }
        let params = SceneParams::new(
            &self.camera,
            self.driver.transform(),
            self.driver.isolation(),
            self.batch.subtract(),
            renderer.buffers.ball_count(),
        );
        renderer.buffers.update_params(&gpu.queue, &params);

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

        renderer.pipeline.draw(&mut encoder, &view);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(fps) = report.fps_sample {
            if let Some(window) = &self.window {
                let paused = if self.driver.state().paused { " [Paused]" } else { "" };
                window.set_title(&format!(
                    "Lava Lamp - {:.0} FPS - speed {:.2}{}",
                    fps,
                    self.driver.state().speed,
                    paused
                ));
            }
        }
    }

    /// Cursor projected onto the trail plane
    fn pointer_point(&self) -> Option<Vec3> {
        let cursor = self.cursor?;
        let renderer = self.renderer.as_ref()?;
        let (width, height) = renderer.gpu.size();
        unproject_pointer(
            &self.camera,
            cursor,
            Vec2::new(width as f32, height as f32),
            TRAIL_PLANE_Z,
        )
    }

    fn handle_cursor(&mut self, position: Vec2) {
        let previous = self.cursor.replace(position);
        if let Some(previous) = previous {
            if self.right_drag {
                self.orbit.rotate(position - previous);
            }
            if self.middle_drag {
                self.orbit.pan(position - previous, &self.camera);
            }
        }
        if self.left_drag {
            let point = self.pointer_point();
            let now = self.now();
            self.driver.trail_mut().drag_move(point, now);
        }
    }

    fn handle_mouse(&mut self, button: MouseButton, state: ElementState) {
        let pressed = state.is_pressed();
        match button {
            MouseButton::Left if pressed => {
                self.left_drag = true;
                let point = self.pointer_point();
                let now = self.now();
                self.driver.trail_mut().drag_start(point, now);
            }
            MouseButton::Left => {
                self.left_drag = false;
                self.driver.trail_mut().drag_end();
            }
            MouseButton::Right => self.right_drag = pressed,
            MouseButton::Middle => self.middle_drag = pressed,
            _ => {}
        }
    }

    /// Drop every drag; button releases are not delivered after focus loss
    fn release_pointer(&mut self) {
        if self.left_drag {
            self.driver.trail_mut().drag_end();
        }
        self.left_drag = false;
        self.right_drag = false;
        self.middle_drag = false;
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        match key_code {
            KeyCode::Space => {
                let state = self.driver.state_mut();
                state.paused = !state.paused;
                log::info!("Simulation {}", if state.paused { "paused" } else { "resumed" });
            }
            KeyCode::BracketLeft => {
                self.driver.state_mut().adjust_speed(-SPEED_STEP);
                log::info!("Speed: {:.2}", self.driver.state().speed);
            }
            KeyCode::BracketRight => {
                self.driver.state_mut().adjust_speed(SPEED_STEP);
                log::info!("Speed: {:.2}", self.driver.state().speed);
            }
            KeyCode::KeyR => {
                self.driver.reset_view();
                self.orbit = OrbitControls::default();
                log::info!("View reset");
            }
            _ => {}
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("Failed to initialize: {}", e);
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
                self.release();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            self.release();
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::Focused(false) => {
                log::debug!("Focus lost, releasing pointer drags");
                self.release_pointer();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse(button, state);
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = &mut self.renderer {
                    log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                    renderer.gpu.resize(new_size);
                    self.camera.set_aspect(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                // Request another frame immediately
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_loss_ends_cut_and_lets_trail_decay() {
        let mut app = App::new();
        app.handle_mouse(MouseButton::Left, ElementState::Pressed);
        app.handle_mouse(MouseButton::Right, ElementState::Pressed);
        // No renderer yet, so seed the trail directly
        app.driver.trail_mut().drag_start(Some(Vec3::ZERO), 0.0);
        assert!(app.driver.trail().is_dragging());

        app.release_pointer();

        assert!(!app.left_drag && !app.right_drag && !app.middle_drag);
        assert!(!app.driver.trail().is_dragging());
        assert!(app.driver.trail().points().all(|p| p.decaying));

        let before = app.driver.trail().points().next().map(|p| p.strength);
        app.driver.trail_mut().decay();
        let after = app.driver.trail().points().next().map(|p| p.strength);
        assert!(after < before);
    }

    #[test]
    fn test_middle_drag_pans() {
        let mut app = App::new();
        app.handle_cursor(Vec2::new(100.0, 100.0));
        app.handle_mouse(MouseButton::Middle, ElementState::Pressed);
        app.handle_cursor(Vec2::new(200.0, 100.0));
        for _ in 0..200 {
            app.orbit.update(&mut app.camera);
        }
        assert!(app.camera.target.x < 0.0);
    }
}
