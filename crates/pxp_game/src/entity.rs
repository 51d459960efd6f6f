use pxp_core::mask::Mask;
use pxp_core::rect::Rect;
use pxp_render::{QuadSpec, SpriteBatch, WHITE};

use crate::sheet::Frame;

pub const BLOCK_NAME: &str = "block";
pub const FIRE_NAME: &str = "fire";

/// Anything that occupies pixels in the level.
pub trait Entity {
    /// Collision-type tag, e.g. [`FIRE_NAME`].
    fn name(&self) -> &str;
    fn rect(&self) -> Rect;
    fn frame(&self) -> &Frame;

    fn mask(&self) -> &Mask {
        &self.frame().mask
    }

    /// Queue the current frame, shifted left by the horizontal scroll.
    fn draw(&self, batch: &mut SpriteBatch, offset_x: i32) {
        let rect = self.rect();
        let frame = self.frame();
        batch.push_quad(QuadSpec {
            texture_key: &frame.texture,
            x: (rect.x - offset_x) as f32,
            y: rect.y as f32,
            width: frame.width as f32,
            height: frame.height as f32,
            uv: frame.uv,
            color: WHITE,
        });
    }
}

/// Position plus the frame currently shown.
///
/// The rect always has the frame's size and the mask always belongs to the
/// frame, because both are only ever replaced together in `set_frame`.
#[derive(Debug, Clone)]
pub struct SpriteBody {
    rect: Rect,
    frame: Frame,
}

impl SpriteBody {
    pub fn new(x: i32, y: i32, frame: Frame) -> Self {
        let rect = Rect::new(x, y, frame.width as i32, frame.height as i32);
        Self { rect, frame }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn rect_mut(&mut self) -> &mut Rect {
        &mut self.rect
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Swap in `frame`, keeping the top-left corner.
    pub fn set_frame(&mut self, frame: &Frame) {
        self.frame = frame.clone();
        self.rect = self
            .rect
            .with_size(frame.width as i32, frame.height as i32);
    }
}

/// Static terrain tile.
#[derive(Debug, Clone)]
pub struct Block {
    body: SpriteBody,
}

impl Block {
    pub fn new(x: i32, y: i32, frame: Frame) -> Self {
        Self {
            body: SpriteBody::new(x, y, frame),
        }
    }
}

impl Entity for Block {
    fn name(&self) -> &str {
        BLOCK_NAME
    }

    fn rect(&self) -> Rect {
        self.body.rect()
    }

    fn frame(&self) -> &Frame {
        self.body.frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn frame(width: u32, height: u32) -> Frame {
        Frame {
            texture: Arc::from("t"),
            uv: [0.0, 0.0, 1.0, 1.0],
            width,
            height,
            mask: Arc::new(Mask::filled(width, height)),
        }
    }

    #[test]
    fn set_frame_resizes_around_top_left() {
        let mut body = SpriteBody::new(10, 20, frame(64, 64));
        body.set_frame(&frame(32, 48));
        assert_eq!(body.rect(), Rect::new(10, 20, 32, 48));
        assert_eq!(body.frame().mask.size(), (32, 48));
    }

    #[test]
    fn draw_subtracts_scroll_offset() {
        let block = Block::new(300, 704, frame(96, 96));
        let mut batch = SpriteBatch::new();
        block.draw(&mut batch, 100);
        assert_eq!(batch.vertices[0].position, [200.0, 704.0]);
        assert_eq!(batch.vertices[2].position, [296.0, 800.0]);
    }

    #[test]
    fn block_is_named_block() {
        let block = Block::new(0, 0, frame(4, 4));
        assert_eq!(block.name(), BLOCK_NAME);
        assert_eq!(block.mask().count(), 16);
    }
}
