use crate::collision::{probe_horizontal, resolve_vertical};
use crate::config::GameConfig;
use crate::entity::{Entity, FIRE_NAME};
use crate::player::{Player, MAX_JUMPS};

/// Keys sampled once per tick. `jump` is edge-triggered; the others are held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Physics {
    pub fps: u32,
    pub player_vel: i32,
    pub gravity: f32,
}

impl Physics {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            fps: config.fps,
            player_vel: config.player_vel,
            gravity: config.gravity,
        }
    }

    /// How far ahead the side probes look.
    pub fn probe_distance(&self) -> i32 {
        self.player_vel * 2
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

/// Jump if the player still has one left. Returns false, touching nothing,
/// once `MAX_JUMPS` have been used since the last landing.
pub fn try_jump(player: &mut Player, physics: &Physics) -> bool {
    if player.jump_count >= MAX_JUMPS {
        return false;
    }
    player.jump(physics.gravity);
    true
}

/// Advance the player one tick against `obstacles`.
pub fn step(
    player: &mut Player,
    input: ControllerInput,
    physics: &Physics,
    obstacles: &[&dyn Entity],
) -> Result<(), String> {
    if input.jump {
        try_jump(player, physics);
    }

    let distance = physics.probe_distance();
    let left = probe_horizontal(player, obstacles, -distance);
    let right = probe_horizontal(player, obstacles, distance);

    player.x_vel = 0.0;
    let speed = physics.player_vel as f32;
    if input.left && !left.blocked {
        player.move_left(speed);
    }
    if input.right && !right.blocked {
        player.move_right(speed);
    }

    player.integrate();
    player.apply_gravity(physics.fps, physics.gravity);
    player.animator.advance();
    player.update_hit_timer(physics.fps);

    let mut contacts = resolve_vertical(player, obstacles);
    contacts.extend(left.contacts);
    contacts.extend(right.contacts);
    if contacts.iter().any(|obstacle| obstacle.name() == FIRE_NAME) {
        player.make_hit();
    }

    player.update_sprite(physics.gravity)
}
