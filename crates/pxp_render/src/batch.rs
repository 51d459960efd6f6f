//! CPU-side sprite mesh rebuilt every frame.
//!
//! Every visible sprite becomes one textured quad. Quads are appended in draw
//! order (background, obstacles, player, debug) and consecutive quads that use
//! the same texture collapse into a single `draw_indexed` call.

use std::sync::Arc;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

impl SpriteVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// A contiguous run of indices that share the same texture binding.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture_key: Arc<str>,
    pub index_start: u32,
    pub index_count: u32,
}

/// One screen-space quad. `x`/`y` are the top-left corner in pixels and
/// `uv` is `[u0, v0, u1, v1]`; mirrored sprites pass `u0 > u1`.
pub struct QuadSpec<'a> {
    pub texture_key: &'a Arc<str>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub uv: [f32; 4],
    pub color: [f32; 4],
}

#[derive(Debug, Default)]
pub struct SpriteBatch {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draw_calls.clear();
    }

    pub fn sprite_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn push_quad(&mut self, quad: QuadSpec<'_>) {
        let [u0, v0, u1, v1] = quad.uv;
        let left = quad.x;
        let top = quad.y;
        let right = quad.x + quad.width;
        let bottom = quad.y + quad.height;
        let base_index = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&[
            SpriteVertex {
                position: [left, top],
                tex_coords: [u0, v0],
                color: quad.color,
            },
            SpriteVertex {
                position: [right, top],
                tex_coords: [u1, v0],
                color: quad.color,
            },
            SpriteVertex {
                position: [right, bottom],
                tex_coords: [u1, v1],
                color: quad.color,
            },
            SpriteVertex {
                position: [left, bottom],
                tex_coords: [u0, v1],
                color: quad.color,
            },
        ]);

        let draw_start = self.indices.len() as u32;
        self.indices.extend_from_slice(&[
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);

        self.push_draw_call(quad.texture_key, draw_start, 6);
    }

    /// Number of texture rebinds the draw list will cause.
    pub fn count_texture_binds(&self) -> usize {
        let mut binds = 0usize;
        let mut current: Option<&str> = None;
        for draw in &self.draw_calls {
            let key: &str = &draw.texture_key;
            if current != Some(key) {
                current = Some(key);
                binds += 1;
            }
        }
        binds
    }

    fn push_draw_call(&mut self, texture_key: &Arc<str>, index_start: u32, index_count: u32) {
        if let Some(last) = self.draw_calls.last_mut() {
            let contiguous = last.index_start + last.index_count == index_start;
            if *last.texture_key == **texture_key && contiguous {
                last.index_count += index_count;
                return;
            }
        }
        self.draw_calls.push(DrawCall {
            texture_key: Arc::clone(texture_key),
            index_start,
            index_count,
        });
    }
}
