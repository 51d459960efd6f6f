use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Screen-space camera: world units are pixels, the origin is the top-left
/// corner of the view and Y grows downward, matching sprite rect coordinates.
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    pub viewport: (u32, u32),
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let view_w = self.viewport.0 as f32 / self.zoom;
        let view_h = self.viewport.1 as f32 / self.zoom;

        // bottom > top flips Y so that +Y points down the screen.
        let proj = Mat4::orthographic_rh(
            self.position.x,
            self.position.x + view_w,
            self.position.y + view_h,
            self.position.y,
            -1.0,
            1.0,
        );

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}
