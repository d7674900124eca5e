use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use glam::Vec2;

mod config;
mod math;
mod renderer;
mod ui;

use config::{Args, VisualizerConfig};
use math::{PlotEngine, PlotKind, PlotResult};
use renderer::{Camera, GpuState, MapUniforms, SceneLayers, generate_grid_vertices};
use ui::state::{AppMode, SurfaceViewMode};
use ui::theme::{PLASMA_STOPS, VIRIDIS_STOPS};
use ui::{PlotInfo, UiActions, UiState, apply_theme, draw_help_overlay, draw_legend, draw_side_panel};

const GRID_HALF_EXTENT: f32 = 200.0;
const GRID_DIVISIONS: u32 = 20;
const GRID_FLOOR_GAP: f32 = 10.0;

#[derive(Default)]
struct InputState {
    forward: f32,
    right: f32,
    up: f32,
    mouse_captured: bool,
    mouse_delta: Vec2,
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    camera: Camera,
    plot_engine: PlotEngine,
    ui_state: UiState,
    input: InputState,

    last_plot: Option<PlotResult>,
    map_rect: egui::Rect,

    last_frame: Instant,
    frame_count: u32,
    fps_timer: Instant,
    fps: f32,

    last_vsync_state: bool,
}

impl App {
    fn new(config: &VisualizerConfig) -> Self {
        Self {
            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            camera: Camera::default(),
            plot_engine: PlotEngine::new(),
            ui_state: UiState::from(config),
            input: InputState::default(),

            last_plot: None,
            map_rect: egui::Rect::NOTHING,

            last_frame: Instant::now(),
            frame_count: 0,
            fps_timer: Instant::now(),
            fps: 0.0,

            last_vsync_state: config.vsync,
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> Result<(), renderer::RenderError> {
        let mut gpu = pollster::block_on(GpuState::new(window.clone()))?;
        gpu.set_vsync(self.ui_state.vsync_enabled);

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );

        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        apply_theme(&self.egui_ctx);

        let size = window.inner_size();
        self.camera.set_aspect(size.width as f32, size.height as f32);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);
        self.plot_engine.invalidate();
        Ok(())
    }

    /// Re-samples only when a widget changed since the last pass.
    fn replot(&mut self, force: bool) {
        let request = self.ui_state.plot_request();
        if !force && self.plot_engine.is_current(&request) {
            return;
        }
        let Some(gpu) = &mut self.gpu else { return };

        let result = self.plot_engine.plot(request);
        let floor = match &result.kind {
            PlotKind::Surface(plot) => {
                gpu.math_buffers.upload_surface(&gpu.queue, &plot.mesh);
                gpu.math_buffers
                    .upload_map(&gpu.queue, &plot.heatmap, &plot.contours);
                plot.mesh.scene_height.0
            }
            PlotKind::LevelSurface(plot) => {
                gpu.math_buffers
                    .upload_level_surface(&gpu.queue, &plot.mesh, &plot.points);
                plot.mesh.scene_height.0
            }
        };
        let grid = generate_grid_vertices(GRID_HALF_EXTENT, GRID_DIVISIONS, floor - GRID_FLOOR_GAP);
        gpu.math_buffers.upload_grid(&gpu.queue, &grid);

        self.last_plot = Some(result);
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_count += 1;
        let elapsed = self.fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            self.fps = self.frame_count as f32 / elapsed;
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }

        self.camera.set_mode(self.ui_state.camera_mode);
        self.camera
            .process_keyboard(self.input.forward, self.input.right, self.input.up, dt);

        if self.input.mouse_captured {
            self.camera.process_mouse_movement(self.input.mouse_delta);
        }
        self.input.mouse_delta = Vec2::ZERO;

        self.replot(false);
    }

    fn shows_map(&self) -> bool {
        self.ui_state.app_mode == AppMode::TwoVariable
            && self.ui_state.surface_view == SurfaceViewMode::Contour2D
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(egui_state)) = (&self.window, &mut self.egui_state) else {
            return;
        };

        let raw_input = egui_state.take_egui_input(window);

        let shows_map = self.shows_map();
        let camera_mode = self.camera.mode;
        let camera_pos = self.camera.position.to_array();

        let mut ui_actions = UiActions::default();
        let mut map_rect = self.map_rect;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            let info = PlotInfo {
                result: self.last_plot.as_ref(),
                fps: self.fps,
            };
            ui_actions = draw_side_panel(ctx, &mut self.ui_state, &info);
            map_rect = ctx.available_rect();

            if let Some(result) = &self.last_plot {
                match &result.kind {
                    PlotKind::Surface(plot) => {
                        draw_legend(ctx, "z", plot.mesh.z_min, plot.mesh.z_max, VIRIDIS_STOPS)
                    }
                    PlotKind::LevelSurface(plot) => {
                        let r = plot.radius as f32;
                        draw_legend(ctx, "z", -r, r, PLASMA_STOPS)
                    }
                }
            }

            if !shows_map {
                draw_help_overlay(ctx, camera_mode, camera_pos);
            }
        });
        self.map_rect = map_rect;

        self.handle_ui_actions(ui_actions);

        let Some(gpu) = &mut self.gpu else { return };
        let Some(window) = &self.window else { return };
        let Some(egui_state) = &mut self.egui_state else {
            return;
        };
        let Some(egui_renderer) = &mut self.egui_renderer else {
            return;
        };

        egui_state.handle_platform_output(window, full_output.platform_output);

        if self.ui_state.vsync_enabled != self.last_vsync_state {
            gpu.set_vsync(self.ui_state.vsync_enabled);
            self.last_vsync_state = self.ui_state.vsync_enabled;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                gpu.resize(gpu.size);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory, exiting");
                event_loop.exit();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout, skipping frame");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.update_camera(&self.camera);

        let ppp = full_output.pixels_per_point;
        let bands = match &self.last_plot {
            Some(PlotResult {
                kind: PlotKind::Surface(plot),
                ..
            }) => plot.curves.len() as u32 + 1,
            _ => 1,
        };
        gpu.math_buffers.write_map_uniforms(
            &gpu.queue,
            MapUniforms::fit(
                (gpu.config.width as f32, gpu.config.height as f32),
                (map_rect.min.x * ppp, map_rect.min.y * ppp),
                (map_rect.width() * ppp, map_rect.height() * ppp),
                bands,
            ),
        );

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        if shows_map {
            gpu.render_map(&view, &mut encoder);
        } else {
            gpu.render_scene(
                &view,
                &mut encoder,
                SceneLayers {
                    grid: self.ui_state.show_grid,
                    surface: true,
                    samples: self.ui_state.show_samples,
                },
            );
        }

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in full_output.textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        window.request_redraw();
    }

    fn handle_ui_actions(&mut self, actions: UiActions) {
        if actions.reset_camera {
            self.camera.reset();
            self.ui_state.camera_mode = self.camera.mode;
        }

        if actions.replot {
            self.replot(true);
        }
    }

    fn release_mouse(&mut self) {
        self.input.mouse_captured = false;
        if let Some(window) = &self.window {
            if let Err(e) = window.set_cursor_grab(winit::window::CursorGrabMode::None) {
                log::debug!("cursor release failed: {e}");
            }
            window.set_cursor_visible(true);
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let value = if pressed { 1.0 } else { 0.0 };

        match key {
            KeyCode::KeyW | KeyCode::KeyZ => self.input.forward = value,
            KeyCode::KeyS => self.input.forward = -value,
            KeyCode::KeyA | KeyCode::KeyQ => self.input.right = -value,
            KeyCode::KeyD => self.input.right = value,
            KeyCode::Space => self.input.up = value,
            KeyCode::ShiftLeft | KeyCode::ControlLeft => self.input.up = -value,
            KeyCode::Escape if pressed => self.release_mouse(),
            KeyCode::KeyR if pressed => self.handle_ui_actions(UiActions {
                reset_camera: true,
                ..Default::default()
            }),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Multivariable Calculus Visualizer")
            .with_inner_size(PhysicalSize::new(1600, 900));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.init_gpu(window) {
            log::error!("{e}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(egui_state) = &mut self.egui_state {
            if let Some(window) = &self.window {
                let response = egui_state.on_window_event(window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("window closed");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                    self.camera
                        .set_aspect(size.width as f32, size.height as f32);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.handle_key(key, event.state == ElementState::Pressed);
                }
            }

            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => {
                if state == ElementState::Pressed && !self.shows_map() {
                    self.input.mouse_captured = true;
                    if let Some(window) = &self.window {
                        if let Err(e) =
                            window.set_cursor_grab(winit::window::CursorGrabMode::Confined)
                        {
                            log::debug!("cursor grab failed: {e}");
                        }
                        window.set_cursor_visible(false);
                    }
                } else {
                    self.release_mouse();
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.camera.process_scroll(scroll);
            }

            WindowEvent::RedrawRequested => {
                self.update();
                self.render(event_loop);
            }

            _ => {}
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: winit::event::DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.input.mouse_captured {
                self.input.mouse_delta.x += delta.0 as f32;
                self.input.mouse_delta.y += delta.1 as f32;
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = VisualizerConfig::try_from(Args::parse()).context("invalid command line")?;
    log::info!("starting in {:?} mode", config.mode);
    log::debug!(
        "initial parameters: {:?}, {:?}",
        config.surface_params(),
        config.level_params()
    );

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&config);
    event_loop.run_app(&mut app).context("event loop terminated")?;
    Ok(())
}
