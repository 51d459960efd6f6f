//! F3 debug panel drawn with egui over the game scene.
//!
//! egui-wgpu wants a `RenderPass<'static>` while `begin_render_pass` borrows
//! the encoder, so a frame is split into `prepare` (UI logic and
//! tessellation), `upload` (textures and buffers), `paint` (a separate pass
//! made `'static` with `forget_lifetime()`) and `cleanup`.
//!
//! Window events are always forwarded to egui so the panel can take clicks
//! while it is shown; UI logic only runs while `visible`.

use pxp_core::time::TimeState;
use winit::window::Window;

/// Per-frame snapshot the game hands to the panel.
#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub draw_calls: u32,
    pub texture_binds: u32,
    pub sprite_count: u32,
    pub player_x: i32,
    pub player_y: i32,
    pub x_vel: f32,
    pub y_vel: f32,
    pub jump_count: u32,
    pub hit: bool,
    pub animation: String,
    pub scroll_offset: i32,
    pub show_collision: bool,
    pub paused: bool,
}

impl OverlayStats {
    pub fn render_lines(&self) -> Vec<String> {
        vec![
            format!("Draw calls: {}", self.draw_calls),
            format!("Texture binds: {}", self.texture_binds),
            format!("Sprites: {}", self.sprite_count),
        ]
    }

    pub fn player_lines(&self) -> Vec<String> {
        vec![
            format!("Position: ({}, {})", self.player_x, self.player_y),
            format!("Velocity: ({:.1}, {:.2})", self.x_vel, self.y_vel),
            format!("Jumps: {}/2", self.jump_count),
            format!("Animation: {}", self.animation),
            format!("Hit: {}", if self.hit { "yes" } else { "no" }),
            format!("Scroll: {}", self.scroll_offset),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    pub toggle_pause: bool,
    /// Advance exactly one fixed step while paused.
    pub single_step: bool,
    pub toggle_collision: bool,
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            visible: false,
        }
    }

    /// Returns true when egui consumed the event.
    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_winit_state.on_window_event(window, event).consumed
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &TimeState,
        stats: &OverlayStats,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if !self.visible {
                return;
            }
            egui::Window::new("Debug")
                .default_pos([10.0, 10.0])
                .show(ctx, |ui| {
                    ui.label(format!("FPS: {:.1}", time.smoothed_fps));
                    ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
                    ui.label(format!("Ticks: {}", time.fixed_step_count));
                    ui.separator();
                    for line in stats.render_lines() {
                        ui.label(line);
                    }
                    ui.separator();
                    for line in stats.player_lines() {
                        ui.label(line);
                    }
                    ui.separator();
                    ui.horizontal(|ui| {
                        let pause_label = if stats.paused { "Resume" } else { "Pause" };
                        if ui.button(pause_label).clicked() {
                            actions.toggle_pause = true;
                        }
                        if stats.paused && ui.button("Step").clicked() {
                            actions.single_step = true;
                        }
                        let mask_label = if stats.show_collision {
                            "Hide masks"
                        } else {
                            "Show masks"
                        };
                        if ui.button(mask_label).clicked() {
                            actions.toggle_collision = true;
                        }
                    });
                    if stats.paused {
                        ui.label("\u{23f8} PAUSED");
                    }
                });
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_lines_report_state() {
        let stats = OverlayStats {
            player_x: 100,
            player_y: 404,
            jump_count: 1,
            hit: true,
            animation: "jump_left".to_string(),
            scroll_offset: -35,
            ..OverlayStats::default()
        };
        let lines = stats.player_lines();
        assert_eq!(lines[0], "Position: (100, 404)");
        assert_eq!(lines[2], "Jumps: 1/2");
        assert_eq!(lines[3], "Animation: jump_left");
        assert_eq!(lines[4], "Hit: yes");
        assert_eq!(lines[5], "Scroll: -35");
    }

    #[test]
    fn render_lines_report_batch_counts() {
        let stats = OverlayStats {
            draw_calls: 4,
            texture_binds: 3,
            sprite_count: 70,
            ..OverlayStats::default()
        };
        assert_eq!(
            stats.render_lines(),
            vec!["Draw calls: 4", "Texture binds: 3", "Sprites: 70"]
        );
    }
}
