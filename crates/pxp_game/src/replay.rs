use crate::controller::ControllerInput;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub jump: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// One input per tick. A jump frame only presses on its first tick, the
    /// way a real key press is edge-triggered.
    pub fn expanded_inputs(&self) -> Vec<ControllerInput> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for i in 0..frame.repeat.max(1) {
                out.push(ControllerInput {
                    left: frame.left,
                    right: frame.right,
                    jump: frame.jump && i == 0,
                });
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(replay)
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::test_assets;
    use crate::config::GameConfig;
    use crate::entity::Entity;
    use crate::level::Level;
    use pxp_core::rect::Rect;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "pxp_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn load_inline(name_hint: &str, json: &str) -> ReplaySequence {
        let path = temp_file_path(name_hint);
        fs::write(&path, json).expect("write replay file");
        let replay = load_replay_from_path(&path).expect("replay should load");
        let _ = fs::remove_file(path);
        replay
    }

    fn stock_level() -> Level {
        Level::new(&test_assets(), &GameConfig::default(), 1200, 800).expect("level")
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let replay = load_inline(
            "parse",
            r#"{
              "frames": [
                { "right": true, "repeat": 3 },
                { "jump": true, "repeat": 2 }
              ]
            }"#,
        );
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 5);
        assert!(expanded[0].right);
        assert!(expanded[3].jump);
        assert!(!expanded[4].jump);
    }

    #[test]
    fn empty_replay_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, r#"{ "frames": [] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("empty replay");
        assert!(err.contains("empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay = load_inline(
            "deterministic",
            r#"{
              "frames": [
                { "repeat": 80 },
                { "right": true, "repeat": 40 },
                { "right": true, "jump": true, "repeat": 30 },
                { "left": true, "repeat": 90 }
              ]
            }"#,
        );
        let inputs = replay.expanded_inputs();

        let mut run_a = stock_level();
        let mut run_b = stock_level();
        for input in &inputs {
            run_a.tick(*input).expect("tick a");
        }
        for input in &inputs {
            run_b.tick(*input).expect("tick b");
        }

        assert_eq!(run_a.player.rect(), run_b.player.rect());
        assert_eq!(run_a.player.y_vel, run_b.player.y_vel);
        assert_eq!(run_a.player.animation(), run_b.player.animation());
        assert_eq!(run_a.scroll, run_b.scroll);
        assert_eq!(run_a.fire.tick(), run_b.fire.tick());
    }

    #[test]
    fn walking_into_fire_stops_and_hurts() {
        let replay = load_inline(
            "fire",
            r#"{
              "frames": [
                { "repeat": 90 },
                { "right": true, "repeat": 60 }
              ]
            }"#,
        );
        let mut level = stock_level();
        for input in replay.expanded_inputs() {
            level.tick(input).expect("tick");
        }

        assert!(level.player.hit);
        assert_eq!(level.player.rect().x, 230);
        assert!(level.player.rect().right() <= level.fire.rect().left());
        assert_eq!(level.player.animation(), "hit_right");
        assert_eq!(level.scroll.offset_x, 0);
    }

    #[test]
    fn double_jump_then_land_restores_jumps() {
        let replay = load_inline(
            "double_jump",
            r#"{
              "frames": [
                { "repeat": 90 },
                { "jump": true, "repeat": 5 },
                { "jump": true, "repeat": 3 },
                { "jump": true, "repeat": 1 },
                { "repeat": 150 }
              ]
            }"#,
        );
        let mut level = stock_level();
        let mut max_jumps = 0;
        for input in replay.expanded_inputs() {
            level.tick(input).expect("tick");
            max_jumps = max_jumps.max(level.player.jump_count);
        }

        assert_eq!(max_jumps, 2);
        assert_eq!(level.player.jump_count, 0);
        assert_eq!(level.player.rect().bottom(), 704);
    }

    #[test]
    fn walking_into_right_margin_scrolls() {
        let replay = load_inline(
            "scroll",
            r#"{ "frames": [ { "right": true, "repeat": 90 } ] }"#,
        );
        let mut level = stock_level();
        // Stand on the open floor well right of the fire.
        *level.player.rect_mut() = Rect::new(700, 640, 64, 64);
        for input in replay.expanded_inputs() {
            level.tick(input).expect("tick");
        }

        assert_eq!(level.player.rect().x, 1150);
        assert!(level.scroll.offset_x > 0);
        let screen_right = level.player.rect().right() - level.scroll.offset_x;
        assert!(screen_right <= level.scroll.view_width - level.scroll.margin);
    }
}
