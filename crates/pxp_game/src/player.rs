//! The player character: kinematic state plus animation selection.
//!
//! Physics here is per tick, not per second: velocities are pixels per tick
//! and gravity ramps with `fall_tick` so a fresh fall starts gently.

use std::sync::Arc;

use pxp_core::animation::TickAnimator;
use pxp_core::rect::Rect;

use crate::entity::{Entity, SpriteBody};
use crate::sheet::{Frame, SpriteSheets};

pub const PLAYER_NAME: &str = "player";
pub const PLAYER_ANIMATION_DELAY: u32 = 3;
pub const MAX_JUMPS: u32 = 2;
/// Upward speed of a jump, in multiples of gravity.
pub const JUMP_GRAVITY_MULTIPLIER: f32 = 8.0;

/// Sequences the state machine can select; each must exist in both
/// directions.
pub const REQUIRED_ANIMATIONS: [&str; 5] = ["idle", "run", "jump", "fall", "hit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn suffix(self) -> &'static str {
        match self {
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    body: SpriteBody,
    sheets: Arc<SpriteSheets>,
    pub x_vel: f32,
    pub y_vel: f32,
    pub facing: Facing,
    pub animator: TickAnimator,
    pub jump_count: u32,
    pub fall_tick: u32,
    pub hit: bool,
    pub hit_tick: u32,
    animation: String,
}

impl Player {
    /// Fails when the sheets lack any sequence the state machine can reach.
    pub fn new(x: i32, y: i32, sheets: Arc<SpriteSheets>) -> Result<Self, String> {
        for base in REQUIRED_ANIMATIONS {
            for facing in [Facing::Left, Facing::Right] {
                let name = format!("{base}_{}", facing.suffix());
                let sequence = sheets
                    .sequence(&name)
                    .map_err(|e| format!("Player sprite validation failed: {e}"))?;
                if sequence.is_empty() {
                    return Err(format!(
                        "Player sprite validation failed: '{name}' has no frames"
                    ));
                }
            }
        }

        let facing = Facing::Left;
        let animation = format!("idle_{}", facing.suffix());
        let first = sheets.sequence(&animation)?[0].clone();
        Ok(Self {
            body: SpriteBody::new(x, y, first),
            sheets,
            x_vel: 0.0,
            y_vel: 0.0,
            facing,
            animator: TickAnimator::new(PLAYER_ANIMATION_DELAY),
            jump_count: 0,
            fall_tick: 0,
            hit: false,
            hit_tick: 0,
            animation,
        })
    }

    #[allow(dead_code)]
    pub fn rect_mut(&mut self) -> &mut Rect {
        self.body.rect_mut()
    }

    /// Name of the sequence shown by the last `update_sprite`.
    pub fn animation(&self) -> &str {
        &self.animation
    }

    pub fn move_left(&mut self, speed: f32) {
        self.x_vel = -speed;
        self.face(Facing::Left);
    }

    pub fn move_right(&mut self, speed: f32) {
        self.x_vel = speed;
        self.face(Facing::Right);
    }

    fn face(&mut self, facing: Facing) {
        if self.facing != facing {
            log::debug!("Player turned {}", facing.suffix());
            self.facing = facing;
            self.animator.reset();
        }
    }

    /// Apply one tick of velocity. Fractions are truncated toward zero.
    pub fn integrate(&mut self) {
        let rect = self.body.rect_mut();
        rect.x = (rect.x as f32 + self.x_vel) as i32;
        rect.y = (rect.y as f32 + self.y_vel) as i32;
    }

    pub fn apply_gravity(&mut self, fps: u32, gravity: f32) {
        self.y_vel += (self.fall_tick as f32 / fps as f32 * gravity).min(1.0);
        self.fall_tick += 1;
    }

    /// Count down invulnerability; `hit` clears after `2 * fps` ticks.
    pub fn update_hit_timer(&mut self, fps: u32) {
        if self.hit {
            self.hit_tick += 1;
        }
        if self.hit_tick >= fps * 2 {
            self.hit = false;
            self.hit_tick = 0;
        }
    }

    /// Caller is responsible for checking `jump_count < MAX_JUMPS`.
    pub fn jump(&mut self, gravity: f32) {
        self.y_vel = -gravity * JUMP_GRAVITY_MULTIPLIER;
        self.animator.reset();
        self.jump_count += 1;
        if self.jump_count == 1 {
            self.fall_tick = 0;
        }
        log::debug!("Player jump {}/{}", self.jump_count, MAX_JUMPS);
    }

    pub fn land_on(&mut self, top: i32) {
        if self.jump_count > 0 {
            log::debug!("Player landed at y={top}");
        }
        self.body.rect_mut().set_bottom(top);
        self.y_vel = 0.0;
        self.fall_tick = 0;
        self.jump_count = 0;
    }

    pub fn bump_ceiling(&mut self, bottom: i32) {
        self.body.rect_mut().set_top(bottom);
        self.y_vel = -self.y_vel;
        self.fall_tick = 0;
    }

    /// Restarts the invulnerability window even if already hit.
    pub fn make_hit(&mut self) {
        if !self.hit {
            log::debug!("Player hit");
        }
        self.hit = true;
        self.hit_tick = 0;
    }

    /// Sequence the current state calls for, first match wins.
    pub fn select_animation(&self, gravity: f32) -> String {
        let base = if self.hit {
            "hit"
        } else if self.y_vel > gravity * 2.0 {
            "fall"
        } else if self.y_vel < 0.0 {
            "jump"
        } else if self.x_vel == 0.0 {
            "idle"
        } else {
            "run"
        };
        format!("{base}_{}", self.facing.suffix())
    }

    /// Pick the frame for this tick and swap the rect size and mask with it.
    pub fn update_sprite(&mut self, gravity: f32) -> Result<(), String> {
        let name = self.select_animation(gravity);
        let sequence = self.sheets.sequence(&name)?;
        if sequence.is_empty() {
            return Err(format!("Animation '{name}' has no frames"));
        }
        let index = self.animator.select(self.sheets.len(), sequence.len());
        self.body.set_frame(&sequence[index]);
        self.animation = name;
        Ok(())
    }
}

impl Entity for Player {
    fn name(&self) -> &str {
        PLAYER_NAME
    }

    fn rect(&self) -> Rect {
        self.body.rect()
    }

    fn frame(&self) -> &Frame {
        self.body.frame()
    }
}

/// Seven sheets both ways, like the stock character: fourteen sequences.
#[cfg(test)]
pub(crate) fn test_player_sheets() -> Arc<SpriteSheets> {
    Arc::new(crate::sheet::solid_sheets(
        &[
            ("double_jump", 6),
            ("fall", 1),
            ("hit", 7),
            ("idle", 11),
            ("jump", 1),
            ("run", 12),
            ("wall_jump", 5),
        ],
        32,
        32,
        true,
    ))
}
