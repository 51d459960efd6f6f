//! Pixel platformer -- main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. Simulation runs inside
//! `RedrawRequested` on a fixed timestep (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- sample keys, tick the level once per slice
//!   3. Rebuild the sprite batch from the level and debug boxes
//!   4. Upload camera uniform, issue draw calls, composite egui overlay
//!
//! Between frames the loop sleeps until the next step is due.

mod assets;
mod collision;
mod config;
mod controller;
mod entity;
mod fire;
mod level;
mod player;
#[cfg(test)]
mod replay;
mod scroll;
mod sheet;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use assets::GameAssets;
use config::{load_config_or_default, GameConfig, CONFIG_PATH};
use controller::ControllerInput;
use entity::Entity;
use level::Level;
use pxp_core::input::{InputState, Key};
use pxp_core::time::TimeState;
use pxp_devtools::{DebugOverlay, OverlayStats};
use pxp_platform::window::PlatformConfig;
use pxp_render::{Camera2D, GpuContext, SpriteBatch, SpritePipeline, SpriteVertex, Texture};

const DEBUG_WHITE_TEXTURE: &str = "__debug_white";
const LEFT_KEYS: [Key; 2] = [Key::Left, Key::A];
const RIGHT_KEYS: [Key; 2] = [Key::Right, Key::D];
const JUMP_KEYS: [Key; 2] = [Key::Space, Key::Up];
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

struct GpuSpriteTexture {
    #[allow(dead_code)]
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

enum StepOutcome {
    Ran,
    Paused,
    Quit,
}

struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    camera: Camera2D,
    sprite_pipeline: SpritePipeline,
    debug_overlay: DebugOverlay,
    level: Level,
    show_collision_debug: bool,
    paused: bool,
    single_step_requested: bool,
    textures: HashMap<Arc<str>, GpuSpriteTexture>,
    white_key: Arc<str>,
    batch: SpriteBatch,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

impl EngineState {
    fn new(
        window: Arc<Window>,
        platform: &PlatformConfig,
        config: &GameConfig,
        assets: &GameAssets,
    ) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);

        // The level is laid out against the configured window size, so the
        // camera keeps that view even if the surface ends up a different size.
        let camera = Camera2D::new(platform.width, platform.height);
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group = sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);

        let mut textures = HashMap::new();
        for sheet in assets.all_images() {
            let texture = Texture::from_image(&gpu.device, &gpu.queue, &sheet.image, &sheet.key);
            let bind_group = sprite_pipeline.create_texture_bind_group(&gpu.device, &texture);
            textures.insert(
                Arc::clone(&sheet.key),
                GpuSpriteTexture {
                    texture,
                    bind_group,
                },
            );
        }
        let white_key: Arc<str> = Arc::from(DEBUG_WHITE_TEXTURE);
        let white = Texture::from_rgba8(
            &gpu.device,
            &gpu.queue,
            &[255, 255, 255, 255],
            1,
            1,
            DEBUG_WHITE_TEXTURE,
        );
        let white_bind_group = sprite_pipeline.create_texture_bind_group(&gpu.device, &white);
        textures.insert(
            Arc::clone(&white_key),
            GpuSpriteTexture {
                texture: white,
                bind_group: white_bind_group,
            },
        );
        log::info!("Uploaded {} textures", textures.len());

        let level = Level::new(
            assets,
            config,
            platform.width as i32,
            platform.height as i32,
        )?;

        let mesh_vertex_capacity = 1024;
        let mesh_index_capacity = 1536;
        let vertex_buffer = create_vertex_buffer(&gpu.device, mesh_vertex_capacity);
        let index_buffer = create_index_buffer(&gpu.device, mesh_index_capacity);

        Ok(Self {
            window,
            gpu,
            time: TimeState::with_rate(config.fps),
            input: InputState::new(),
            camera,
            sprite_pipeline,
            debug_overlay,
            level,
            show_collision_debug: false,
            paused: false,
            single_step_requested: false,
            textures,
            white_key,
            batch: SpriteBatch::new(),
            vertex_buffer,
            index_buffer,
            mesh_vertex_capacity,
            mesh_index_capacity,
            camera_buffer,
            camera_bind_group,
        })
    }

    /// One fixed slice: hotkeys, then the level tick. Edge-triggered input is
    /// cleared right after sampling so a single press jumps once.
    fn fixed_step(&mut self) -> Result<StepOutcome, String> {
        if self.input.is_just_pressed(Key::Escape) {
            return Ok(StepOutcome::Quit);
        }
        if self.input.is_just_pressed(Key::F3) {
            self.debug_overlay.toggle();
        }
        if self.input.is_just_pressed(Key::F4) {
            self.toggle_collision_debug();
        }

        if self.paused && !self.single_step_requested {
            self.input.end_frame();
            return Ok(StepOutcome::Paused);
        }
        self.single_step_requested = false;

        let controller_input = ControllerInput {
            left: self.input.any_held(&LEFT_KEYS),
            right: self.input.any_held(&RIGHT_KEYS),
            jump: self.input.any_just_pressed(&JUMP_KEYS),
        };
        self.input.end_frame();

        self.level.tick(controller_input)?;
        Ok(StepOutcome::Ran)
    }

    fn toggle_collision_debug(&mut self) {
        self.show_collision_debug = !self.show_collision_debug;
        log::info!(
            "Collision debug: {}",
            if self.show_collision_debug { "ON" } else { "OFF" }
        );
    }

    fn rebuild_batch(&mut self) {
        self.batch.clear();
        self.level.draw(&mut self.batch);
        if self.show_collision_debug {
            self.level
                .draw_collision_debug(&mut self.batch, &self.white_key);
        }

        let vertex_count = self.batch.vertices.len();
        let index_count = self.batch.indices.len();
        self.ensure_mesh_capacity(vertex_count, index_count);
        if vertex_count > 0 {
            self.gpu.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&self.batch.vertices),
            );
        }
        if index_count > 0 {
            self.gpu.queue.write_buffer(
                &self.index_buffer,
                0,
                bytemuck::cast_slice(&self.batch.indices),
            );
        }
    }

    fn overlay_stats(&self) -> OverlayStats {
        let player = &self.level.player;
        let rect = player.rect();
        OverlayStats {
            draw_calls: self.batch.draw_calls.len() as u32,
            texture_binds: self.batch.count_texture_binds() as u32,
            sprite_count: self.batch.sprite_count() as u32,
            player_x: rect.x,
            player_y: rect.y,
            x_vel: player.x_vel,
            y_vel: player.y_vel,
            jump_count: player.jump_count,
            hit: player.hit,
            animation: player.animation().to_string(),
            scroll_offset: self.level.scroll.offset_x,
            show_collision: self.show_collision_debug,
            paused: self.paused,
        }
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }

    fn render(&mut self) -> Result<(), String> {
        let camera_uniform = self.camera.build_uniform();
        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera_uniform]),
        );

        let Some((output, view)) = self.gpu.begin_frame()? else {
            return Ok(());
        };

        let stats = self.overlay_stats();
        let (egui_primitives, egui_textures_delta, overlay_actions) =
            self.debug_overlay.prepare(&self.window, &self.time, &stats);

        if overlay_actions.toggle_pause {
            self.paused = !self.paused;
            log::info!(
                "Simulation {}",
                if self.paused { "PAUSED" } else { "RESUMED" }
            );
        }
        if overlay_actions.single_step {
            self.single_step_requested = true;
        }
        if overlay_actions.toggle_collision {
            self.toggle_collision_debug();
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut last_bound_texture_key: Option<&Arc<str>> = None;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            render_pass.set_pipeline(&self.sprite_pipeline.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            for draw in &self.batch.draw_calls {
                let Some(texture) = self.textures.get(&draw.texture_key) else {
                    log::warn!("No GPU texture for '{}'", draw.texture_key);
                    continue;
                };
                let need_rebind = match last_bound_texture_key {
                    Some(last) => **last != *draw.texture_key,
                    None => true,
                };
                if need_rebind {
                    render_pass.set_bind_group(1, &texture.bind_group, &[]);
                    last_bound_texture_key = Some(&draw.texture_key);
                }
                render_pass.draw_indexed(
                    draw.index_start..(draw.index_start + draw.index_count),
                    0,
                    0..1,
                );
            }
        }

        self.debug_overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
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
                    ..Default::default()
                })
                .forget_lifetime();

            self.debug_overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.debug_overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

struct App {
    platform: PlatformConfig,
    game: GameConfig,
    assets: GameAssets,
    state: Option<EngineState>,
}

impl App {
    fn new(platform: PlatformConfig, game: GameConfig, assets: GameAssets) -> Self {
        Self {
            platform,
            game,
            assets,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = pxp_platform::window::create_window(event_loop, &self.platform)
            .unwrap_or_else(|err| panic!("{err}"));
        log::info!(
            "Window created: {}x{}",
            self.platform.width,
            self.platform.height
        );
        let state = EngineState::new(window, &self.platform, &self.game, &self.assets)
            .unwrap_or_else(|err| panic!("Startup failed: {err}"));
        state.window.request_redraw();
        self.state = Some(state);
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if let StartCause::ResumeTimeReached { .. } = cause {
            if let Some(state) = &self.state {
                state.window.request_redraw();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            event_loop.set_control_flow(ControlFlow::WaitUntil(state.time.next_step_deadline()));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::Focused(false) => {
                state.input.release_all();
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(game_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(game_key),
                            ElementState::Released => state.input.key_up(game_key),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                state.time.begin_frame();
                while state.time.should_step() {
                    match state.fixed_step() {
                        Ok(StepOutcome::Ran | StepOutcome::Paused) => {}
                        Ok(StepOutcome::Quit) => {
                            log::info!("Escape pressed, exiting.");
                            event_loop.exit();
                            return;
                        }
                        Err(err) => {
                            log::error!("Simulation step failed: {err}");
                            event_loop.exit();
                            return;
                        }
                    }
                }

                state.rebuild_batch();
                if let Err(err) = state.render() {
                    log::error!("Render failed: {err}");
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Space => Some(Key::Space),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::F4 => Some(Key::F4),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyD => Some(Key::D),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Pixel platformer starting...");

    let platform = PlatformConfig::default();
    let game = load_config_or_default(Path::new(CONFIG_PATH), platform.width)
        .unwrap_or_else(|err| panic!("{err}"));
    let assets = GameAssets::load(&game).unwrap_or_else(|err| panic!("{err}"));

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => panic!("Failed to create event loop: {err}"),
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(platform, game, assets);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {err}");
    }
}
