//! Pixel-mask collision between the player and the level's obstacles.
//!
//! Movement is resolved one axis at a time, and the two axes are handled
//! differently:
//!
//!  - **Horizontal is predictive.** Before the player moves, a copy of its
//!    rect is shifted by the probe distance and tested against every
//!    obstacle. The player itself is never touched; a blocked probe simply
//!    stops the controller from setting velocity in that direction.
//!  - **Vertical is reactive.** After the real move, overlaps at the new
//!    position are corrected by snapping the player to the obstacle's top
//!    (landing) or bottom (ceiling) edge.
//!
//! Overlap is always per pixel: only solid mask bits count, never bounds.

use pxp_core::mask::Mask;
use pxp_core::rect::Rect;

use crate::entity::Entity;
use crate::player::Player;

/// True when `mask` placed at `rect` shares a solid pixel with `other`.
pub fn collide(rect: Rect, mask: &Mask, other: &dyn Entity) -> bool {
    let other_rect = other.rect();
    if !rect.intersects(&other_rect) {
        return false;
    }
    mask.overlaps(
        other.mask(),
        other_rect.x - rect.x,
        other_rect.y - rect.y,
    )
}

#[derive(Default)]
pub struct ProbeResult<'a> {
    pub blocked: bool,
    pub contacts: Vec<&'a dyn Entity>,
}

/// Test the player shifted `dx` pixels sideways against every obstacle.
pub fn probe_horizontal<'a>(
    player: &Player,
    obstacles: &[&'a dyn Entity],
    dx: i32,
) -> ProbeResult<'a> {
    let moved = player.rect().translated(dx, 0);
    let contacts: Vec<&'a dyn Entity> = obstacles
        .iter()
        .copied()
        .filter(|obstacle| collide(moved, player.mask(), *obstacle))
        .collect();
    ProbeResult {
        blocked: !contacts.is_empty(),
        contacts,
    }
}

/// Push the player out of whatever it overlaps after moving, in obstacle
/// order, and return everything it touched.
///
/// Falling onto an obstacle lands on it; rising into one bounces off its
/// underside with the vertical speed reversed. Each obstacle is tested
/// against the position left by the previous correction.
pub fn resolve_vertical<'a>(
    player: &mut Player,
    obstacles: &[&'a dyn Entity],
) -> Vec<&'a dyn Entity> {
    let mut contacts = Vec::new();
    for &obstacle in obstacles {
        if !collide(player.rect(), player.mask(), obstacle) {
            continue;
        }
        let other = obstacle.rect();
        if player.y_vel > 0.0 {
            player.land_on(other.top());
        } else if player.y_vel < 0.0 {
            player.bump_ceiling(other.bottom());
        }
        contacts.push(obstacle);
    }
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Block;
    use crate::player::test_player_sheets;
    use crate::sheet::Frame;
    use std::sync::Arc;

    fn solid_frame(width: u32, height: u32) -> Frame {
        Frame {
            texture: Arc::from("terrain"),
            uv: [0.0, 0.0, 1.0, 1.0],
            width,
            height,
            mask: Arc::new(Mask::filled(width, height)),
        }
    }

    fn block(x: i32, y: i32) -> Block {
        Block::new(x, y, solid_frame(96, 96))
    }

    fn player_at(x: i32, y: i32) -> Player {
        Player::new(x, y, test_player_sheets()).expect("player")
    }

    #[test]
    fn edge_contact_is_not_a_collision() {
        let floor = block(0, 500);
        let rect = Rect::new(0, 436, 64, 64);
        assert!(!collide(rect, &Mask::filled(64, 64), &floor));
        assert!(collide(rect.translated(0, 1), &Mask::filled(64, 64), &floor));
    }

    #[test]
    fn transparent_pixels_do_not_collide() {
        let mut ring = Mask::new(96, 96);
        ring.set(0, 0, true);
        let hollow = Block::new(
            0,
            0,
            Frame {
                mask: Arc::new(ring),
                ..solid_frame(96, 96)
            },
        );
        let rect = Rect::new(40, 40, 8, 8);
        assert!(!collide(rect, &Mask::filled(8, 8), &hollow));
        assert!(collide(Rect::new(0, 0, 8, 8), &Mask::filled(8, 8), &hollow));
    }

    #[test]
    fn probe_does_not_move_the_player() {
        let player = player_at(100, 436);
        let wall = block(164, 404);
        let obstacles: Vec<&dyn Entity> = vec![&wall];
        let before = player.rect();

        let right = probe_horizontal(&player, &obstacles, 10);
        let left = probe_horizontal(&player, &obstacles, -10);

        assert!(right.blocked);
        assert_eq!(right.contacts.len(), 1);
        assert!(!left.blocked);
        assert!(left.contacts.is_empty());
        assert_eq!(player.rect(), before);
    }

    #[test]
    fn landing_snaps_bottom_and_clears_fall_state() {
        let floor = block(0, 500);
        let obstacles: Vec<&dyn Entity> = vec![&floor];
        let mut player = player_at(10, 450);
        player.y_vel = 12.0;
        player.fall_tick = 33;
        player.jump_count = 2;

        let contacts = resolve_vertical(&mut player, &obstacles);

        assert_eq!(contacts.len(), 1);
        assert_eq!(player.rect().bottom(), 500);
        assert_eq!(player.y_vel, 0.0);
        assert_eq!(player.fall_tick, 0);
        assert_eq!(player.jump_count, 0);
    }

    #[test]
    fn ceiling_reverses_speed_and_keeps_jump_count() {
        let ceiling = block(0, 100);
        let obstacles: Vec<&dyn Entity> = vec![&ceiling];
        let mut player = player_at(10, 190);
        player.y_vel = -8.0;
        player.fall_tick = 5;
        player.jump_count = 1;

        let contacts = resolve_vertical(&mut player, &obstacles);

        assert_eq!(contacts.len(), 1);
        assert_eq!(player.rect().top(), 196);
        assert_eq!(player.y_vel, 8.0);
        assert_eq!(player.fall_tick, 0);
        assert_eq!(player.jump_count, 1);
    }

    #[test]
    fn resting_overlap_is_reported_without_correction() {
        let floor = block(0, 500);
        let obstacles: Vec<&dyn Entity> = vec![&floor];
        let mut player = player_at(10, 440);
        let contacts = resolve_vertical(&mut player, &obstacles);
        assert_eq!(contacts.len(), 1);
        assert_eq!(player.rect().y, 440);
    }

    #[test]
    fn no_overlap_leaves_player_alone() {
        let floor = block(0, 500);
        let obstacles: Vec<&dyn Entity> = vec![&floor];
        let mut player = player_at(10, 100);
        player.y_vel = 3.0;
        player.fall_tick = 9;
        let contacts = resolve_vertical(&mut player, &obstacles);
        assert!(contacts.is_empty());
        assert_eq!(player.y_vel, 3.0);
        assert_eq!(player.fall_tick, 9);
    }
}
