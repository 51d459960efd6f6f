use std::sync::Arc;

use pxp_core::animation::TickAnimator;
use pxp_core::rect::Rect;

use crate::entity::{Entity, SpriteBody, FIRE_NAME};
use crate::sheet::{Frame, SpriteSheets};

pub const FIRE_ANIMATION_DELAY: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireState {
    Off,
    On,
    Hit,
}

impl FireState {
    pub const ALL: [FireState; 3] = [FireState::Off, FireState::On, FireState::Hit];

    pub fn sequence_name(self) -> &'static str {
        match self {
            FireState::Off => "off",
            FireState::On => "on",
            FireState::Hit => "hit",
        }
    }
}

/// Animated hazard. Touching it from any side hurts the player.
#[derive(Debug, Clone)]
pub struct Fire {
    body: SpriteBody,
    sheets: Arc<SpriteSheets>,
    state: FireState,
    animator: TickAnimator,
}

impl Fire {
    pub fn new(x: i32, y: i32, sheets: Arc<SpriteSheets>) -> Result<Self, String> {
        for state in FireState::ALL {
            sheets
                .sequence(state.sequence_name())
                .map_err(|e| format!("Fire trap: {e}"))?;
        }
        let first = first_frame(&sheets, FireState::Off)?;
        Ok(Self {
            body: SpriteBody::new(x, y, first),
            sheets,
            state: FireState::Off,
            animator: TickAnimator::new(FIRE_ANIMATION_DELAY),
        })
    }

    pub fn on(&mut self) {
        self.state = FireState::On;
    }

    #[allow(dead_code)]
    pub fn off(&mut self) {
        self.state = FireState::Off;
    }

    #[allow(dead_code)]
    pub fn hit(&mut self) {
        self.state = FireState::Hit;
    }

    #[allow(dead_code)]
    pub fn state(&self) -> FireState {
        self.state
    }

    #[allow(dead_code)]
    pub fn tick(&self) -> u32 {
        self.animator.tick
    }

    /// Show the frame for the current tick, then advance the tick.
    pub fn advance(&mut self) -> Result<(), String> {
        let sequence = self.sheets.sequence(self.state.sequence_name())?;
        let index = self.animator.select(self.sheets.len(), sequence.len());
        self.body.set_frame(&sequence[index]);
        self.animator.advance();
        Ok(())
    }
}

fn first_frame(sheets: &SpriteSheets, state: FireState) -> Result<Frame, String> {
    sheets
        .sequence(state.sequence_name())?
        .first()
        .cloned()
        .ok_or_else(|| format!("Fire sequence '{}' has no frames", state.sequence_name()))
}

impl Entity for Fire {
    fn name(&self) -> &str {
        FIRE_NAME
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
    use crate::sheet::solid_sheets;

    fn fire_sheets() -> Arc<SpriteSheets> {
        Arc::new(solid_sheets(&[("hit", 4), ("off", 1), ("on", 8)], 16, 32, false))
    }

    #[test]
    fn fire_needs_all_three_states() {
        let sheets = Arc::new(solid_sheets(&[("off", 1), ("on", 8)], 16, 32, false));
        let err = Fire::new(0, 0, sheets).expect_err("hit sequence missing");
        assert!(err.contains("'hit'"));
    }

    #[test]
    fn fire_starts_off_at_scaled_size() {
        let fire = Fire::new(300, 640, fire_sheets()).expect("fire");
        assert_eq!(fire.state(), FireState::Off);
        assert_eq!(fire.rect(), Rect::new(300, 640, 32, 64));
        assert_eq!(fire.name(), FIRE_NAME);
    }

    #[test]
    fn advance_selects_then_ticks() {
        let mut fire = Fire::new(0, 0, fire_sheets()).expect("fire");
        fire.on();
        let on = fire.sheets.sequence("on").expect("on").to_vec();

        fire.advance().expect("advance");
        assert_eq!(fire.frame().uv, on[0].uv);
        assert_eq!(fire.tick(), 1);

        for _ in 0..10 {
            fire.advance().expect("advance");
        }
        // Tick 10 was shown last.
        assert_eq!(fire.frame().uv, on[1].uv);
        assert_eq!(fire.tick(), 11);
    }

    #[test]
    fn counter_wraps_at_registered_sequence_count() {
        let mut fire = Fire::new(0, 0, fire_sheets()).expect("fire");
        fire.on();
        // Three sequences registered: the counter wraps once tick / 10 == 3.
        for _ in 0..30 {
            fire.advance().expect("advance");
        }
        assert_eq!(fire.tick(), 30);
        fire.advance().expect("advance");
        assert_eq!(fire.tick(), 1);
        let on = fire.sheets.sequence("on").expect("on");
        assert_eq!(fire.frame().uv, on[0].uv);
    }

    #[test]
    fn state_switches_keep_the_tick() {
        let mut fire = Fire::new(0, 0, fire_sheets()).expect("fire");
        fire.on();
        for _ in 0..5 {
            fire.advance().expect("advance");
        }
        fire.hit();
        assert_eq!(fire.state(), FireState::Hit);
        assert_eq!(fire.tick(), 5);
        fire.off();
        assert_eq!(fire.state(), FireState::Off);
    }
}
