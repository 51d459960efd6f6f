//! Gameplay tuning loaded from `assets/config/game.json`.
//!
//! Every field has a default, so the file may list only the values it wants
//! to override. A missing file is not an error; a malformed or out-of-range
//! one is.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH: &str = "assets/config/game.json";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub fps: u32,
    pub player_vel: i32,
    pub gravity: f32,
    /// Source size of a terrain tile; blocks are drawn at twice this.
    pub block_size: u32,
    pub scroll_margin: i32,
    pub asset_root: PathBuf,
    pub background: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            player_vel: 5,
            gravity: 1.0,
            block_size: 48,
            scroll_margin: 200,
            asset_root: PathBuf::from("assets"),
            background: "Blue.png".to_string(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self, window_width: u32) -> Result<(), String> {
        if self.fps == 0 {
            return Err("Config validation failed: fps must be > 0".to_string());
        }
        if self.player_vel <= 0 {
            return Err("Config validation failed: player_vel must be > 0".to_string());
        }
        if self.gravity.is_nan() || self.gravity <= 0.0 {
            return Err("Config validation failed: gravity must be > 0".to_string());
        }
        if self.block_size == 0 {
            return Err("Config validation failed: block_size must be > 0".to_string());
        }
        if self.scroll_margin < 0 || self.scroll_margin as u32 * 2 >= window_width {
            return Err(format!(
                "Config validation failed: scroll_margin {} must be in [0, {})",
                self.scroll_margin,
                window_width / 2
            ));
        }
        if self.background.is_empty() {
            return Err("Config validation failed: background must name an image".to_string());
        }
        Ok(())
    }

    /// Drawn block edge in pixels.
    pub fn scaled_block_size(&self) -> i32 {
        self.block_size as i32 * 2
    }
}

pub fn load_config_from_path(path: &Path, window_width: u32) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    config.validate(window_width)?;
    Ok(config)
}

/// Like [`load_config_from_path`], but a file that does not exist yields the
/// defaults.
pub fn load_config_or_default(path: &Path, window_width: u32) -> Result<GameConfig, String> {
    if !path.exists() {
        log::warn!(
            "Config '{}' not found, using built-in defaults",
            path.display()
        );
        let config = GameConfig::default();
        config.validate(window_width)?;
        return Ok(config);
    }
    let config = load_config_from_path(path, window_width)?;
    log::info!("Loaded config from '{}'", path.display());
    Ok(config)
}
