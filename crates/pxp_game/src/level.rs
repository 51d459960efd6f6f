//! The single hardcoded level and its per-tick update.
//!
//! Tick order: fire animation, player controller (probes, motion, vertical
//! resolve, hazards, animation), then scroll. Drawing reads the result.

use std::sync::Arc;

use pxp_core::rect::Rect;
use pxp_render::{QuadSpec, SpriteBatch, WHITE};

use crate::assets::GameAssets;
use crate::config::GameConfig;
use crate::controller::{self, ControllerInput, Physics};
use crate::entity::{Block, Entity};
use crate::fire::Fire;
use crate::player::Player;
use crate::scroll::ScrollState;
use crate::sheet::Frame;

pub const PLAYER_START: (i32, i32) = (100, 100);
pub const FIRE_START_X: i32 = 300;
pub const DEBUG_COLLISION_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.25];

/// Background tile repeated over the whole window, ignoring scroll.
#[derive(Debug, Clone)]
pub struct Background {
    frame: Frame,
    tiles: Vec<(i32, i32)>,
}

impl Background {
    pub fn new(frame: Frame, view_width: i32, view_height: i32) -> Self {
        let tiles = tile_positions(
            view_width,
            view_height,
            frame.width as i32,
            frame.height as i32,
        );
        Self { frame, tiles }
    }

    #[allow(dead_code)]
    pub fn tiles(&self) -> &[(i32, i32)] {
        &self.tiles
    }

    pub fn draw(&self, batch: &mut SpriteBatch) {
        for &(x, y) in &self.tiles {
            batch.push_quad(QuadSpec {
                texture_key: &self.frame.texture,
                x: x as f32,
                y: y as f32,
                width: self.frame.width as f32,
                height: self.frame.height as f32,
                uv: self.frame.uv,
                color: WHITE,
            });
        }
    }
}

/// Top-left corners of the tiles that cover a `view_width`×`view_height`
/// window, column by column.
pub fn tile_positions(
    view_width: i32,
    view_height: i32,
    tile_width: i32,
    tile_height: i32,
) -> Vec<(i32, i32)> {
    if tile_width <= 0 || tile_height <= 0 {
        return Vec::new();
    }
    let mut tiles = Vec::new();
    let mut x = 0;
    while x < view_width {
        let mut y = 0;
        while y < view_height {
            tiles.push((x, y));
            y += tile_height;
        }
        x += tile_width;
    }
    tiles
}

pub struct Level {
    pub player: Player,
    pub blocks: Vec<Block>,
    pub fire: Fire,
    pub scroll: ScrollState,
    pub background: Background,
    pub physics: Physics,
}

impl Level {
    pub fn new(
        assets: &GameAssets,
        config: &GameConfig,
        view_width: i32,
        view_height: i32,
    ) -> Result<Self, String> {
        let block_size = config.scaled_block_size();
        let floor_y = view_height - block_size;

        let mut blocks: Vec<Block> = (-view_width..view_width * 2)
            .step_by(block_size as usize)
            .map(|x| Block::new(x, floor_y, assets.block.clone()))
            .collect();
        blocks.push(Block::new(0, view_height - block_size * 2, assets.block.clone()));
        blocks.push(Block::new(
            block_size * 3,
            view_height - block_size * 4,
            assets.block.clone(),
        ));

        let fire_height = assets
            .fire_sheets
            .sequence("off")?
            .first()
            .map(|frame| frame.height as i32)
            .unwrap_or_default();
        let mut fire = Fire::new(
            FIRE_START_X,
            floor_y - fire_height,
            Arc::clone(&assets.fire_sheets),
        )?;
        fire.on();

        let (px, py) = PLAYER_START;
        let player = Player::new(px, py, Arc::clone(&assets.player_sheets))?;

        log::info!(
            "Level built: {} blocks, fire at ({}, {}), player at ({px}, {py})",
            blocks.len(),
            fire.rect().x,
            fire.rect().y
        );

        Ok(Self {
            player,
            blocks,
            fire,
            scroll: ScrollState::new(view_width, config.scroll_margin),
            background: Background::new(assets.background.clone(), view_width, view_height),
            physics: Physics::from_config(config),
        })
    }

    /// Everything the player collides with, in resolution order.
    pub fn obstacles(&self) -> Vec<&dyn Entity> {
        obstacle_list(&self.blocks, &self.fire)
    }

    pub fn tick(&mut self, input: ControllerInput) -> Result<(), String> {
        self.fire.advance()?;

        let obstacles = obstacle_list(&self.blocks, &self.fire);
        controller::step(&mut self.player, input, &self.physics, &obstacles)?;

        self.scroll.follow(self.player.rect(), self.player.x_vel);
        Ok(())
    }

    /// Background, obstacles, then the player.
    pub fn draw(&self, batch: &mut SpriteBatch) {
        self.background.draw(batch);
        let offset_x = self.scroll.offset_x;
        for obstacle in self.obstacles() {
            obstacle.draw(batch, offset_x);
        }
        self.player.draw(batch, offset_x);
    }

    /// Translucent boxes over every entity's bounds.
    pub fn draw_collision_debug(&self, batch: &mut SpriteBatch, white_texture: &Arc<str>) {
        let offset_x = self.scroll.offset_x;
        let mut rects: Vec<Rect> = self.obstacles().iter().map(|o| o.rect()).collect();
        rects.push(self.player.rect());
        for rect in rects {
            batch.push_quad(QuadSpec {
                texture_key: white_texture,
                x: (rect.x - offset_x) as f32,
                y: rect.y as f32,
                width: rect.w as f32,
                height: rect.h as f32,
                uv: [0.0, 0.0, 1.0, 1.0],
                color: DEBUG_COLLISION_COLOR,
            });
        }
    }
}

fn obstacle_list<'a>(blocks: &'a [Block], fire: &'a Fire) -> Vec<&'a dyn Entity> {
    let mut obstacles: Vec<&dyn Entity> = Vec::with_capacity(blocks.len() + 1);
    obstacles.extend(blocks.iter().map(|block| block as &dyn Entity));
    obstacles.push(fire);
    obstacles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{test_assets, BACKGROUND_TEXTURE, TERRAIN_TEXTURE};
    use crate::fire::FireState;

    fn stock_level() -> Level {
        Level::new(&test_assets(), &GameConfig::default(), 1200, 800).expect("level")
    }

    #[test]
    fn tiles_cover_window_stepping_by_tile_size() {
        let tiles = tile_positions(130, 100, 64, 48);
        assert_eq!(
            tiles,
            vec![
                (0, 0),
                (0, 48),
                (0, 96),
                (64, 0),
                (64, 48),
                (64, 96),
                (128, 0),
                (128, 48),
                (128, 96),
            ]
        );
    }

    #[test]
    fn stock_layout() {
        let level = stock_level();
        // Floor from -1200 to 2400 in 96 px steps, plus two raised blocks.
        assert_eq!(level.blocks.len(), 38 + 2);
        assert_eq!(level.blocks[0].rect(), Rect::new(-1200, 704, 96, 96));
        assert_eq!(level.blocks[38].rect(), Rect::new(0, 608, 96, 96));
        assert_eq!(level.blocks[39].rect(), Rect::new(288, 416, 96, 96));
        assert_eq!(level.fire.rect(), Rect::new(300, 640, 32, 64));
        assert_eq!(level.fire.state(), FireState::On);
        assert_eq!(level.player.rect(), Rect::new(100, 100, 64, 64));
        assert_eq!(level.background.tiles().len(), 19 * 13);
    }

    #[test]
    fn obstacles_end_with_fire() {
        let level = stock_level();
        let obstacles = level.obstacles();
        assert_eq!(obstacles.len(), 41);
        assert_eq!(obstacles[0].name(), "block");
        assert_eq!(obstacles[40].name(), "fire");
    }

    #[test]
    fn player_drops_onto_floor_and_rests() {
        let mut level = stock_level();
        for _ in 0..240 {
            level.tick(ControllerInput::default()).expect("tick");
        }
        // x 100..164 clears the raised block at 0..96, so the floor catches it.
        assert_eq!(level.player.rect().bottom(), 704);
        assert!(level.player.y_vel < 2.0);
        assert_eq!(level.player.jump_count, 0);
        assert!(!level.player.hit);
        assert_eq!(level.player.animation(), "idle_left");
    }

    #[test]
    fn draw_order_is_background_obstacles_player() {
        let level = stock_level();
        let mut batch = SpriteBatch::new();
        level.draw(&mut batch);

        let tiles = level.background.tiles().len();
        assert_eq!(batch.sprite_count(), tiles + 41 + 1);
        assert_eq!(&*batch.draw_calls[0].texture_key, BACKGROUND_TEXTURE);
        assert_eq!(&*batch.draw_calls[1].texture_key, TERRAIN_TEXTURE);
        assert_eq!(batch.draw_calls.len(), 4);
        assert_eq!(batch.count_texture_binds(), 4);
    }

    #[test]
    fn scroll_shifts_world_but_not_background() {
        let mut level = stock_level();
        level.scroll.offset_x = 50;
        let mut batch = SpriteBatch::new();
        level.draw(&mut batch);

        assert_eq!(batch.vertices[0].position, [0.0, 0.0]);
        let first_block = level.background.tiles().len() * 4;
        assert_eq!(batch.vertices[first_block].position, [-1250.0, 704.0]);
    }

    #[test]
    fn collision_debug_adds_one_quad_per_entity() {
        let level = stock_level();
        let white: Arc<str> = Arc::from("white");
        let mut batch = SpriteBatch::new();
        level.draw_collision_debug(&mut batch, &white);
        assert_eq!(batch.sprite_count(), 42);
        assert_eq!(batch.draw_calls.len(), 1);
        assert_eq!(batch.vertices[0].color, DEBUG_COLLISION_COLOR);
    }
}
