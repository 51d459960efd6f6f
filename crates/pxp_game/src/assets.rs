//! Startup asset loading. Everything is read once, before the event loop
//! starts, and any failure is fatal.

use std::path::Path;
use std::sync::Arc;

use crate::config::GameConfig;
use crate::sheet::{load_image, load_tile, Frame, SheetImage, SpriteSheets};

pub const PLAYER_SHEET_DIR: &str = "MainCharacters/MaskDude";
pub const PLAYER_FRAME_SIZE: (u32, u32) = (32, 32);
pub const FIRE_SHEET_DIR: &str = "Traps/Fire";
pub const FIRE_FRAME_SIZE: (u32, u32) = (16, 32);
pub const TERRAIN_PATH: &str = "Terrain/Terrain.png";
/// Top-left of the grass tile inside the terrain sheet.
pub const TERRAIN_TILE_ORIGIN: (u32, u32) = (96, 0);
pub const BACKGROUND_DIR: &str = "Background";

pub const TERRAIN_TEXTURE: &str = "Terrain/block";
pub const BACKGROUND_TEXTURE: &str = "Background/tile";

pub struct GameAssets {
    pub player_sheets: Arc<SpriteSheets>,
    pub fire_sheets: Arc<SpriteSheets>,
    pub block: Frame,
    pub background: Frame,
    /// Standalone images (terrain tile, background) not owned by a sheet set.
    pub images: Vec<SheetImage>,
}

impl GameAssets {
    pub fn load(config: &GameConfig) -> Result<Self, String> {
        let root = config.asset_root.as_path();
        let (pw, ph) = PLAYER_FRAME_SIZE;
        let player_sheets = SpriteSheets::load_dir(&root.join(PLAYER_SHEET_DIR), pw, ph, true)?;
        let (fw, fh) = FIRE_FRAME_SIZE;
        let fire_sheets = SpriteSheets::load_dir(&root.join(FIRE_SHEET_DIR), fw, fh, false)?;

        let (tx, ty) = TERRAIN_TILE_ORIGIN;
        let (block_image, block) = load_tile(
            &root.join(TERRAIN_PATH),
            Arc::from(TERRAIN_TEXTURE),
            tx,
            ty,
            config.block_size,
        )?;

        let (background_image, background) =
            load_background(&root.join(BACKGROUND_DIR).join(&config.background))?;

        log::info!(
            "Assets loaded from '{}': {} player sequences, {} fire sequences, {}x{} background",
            root.display(),
            player_sheets.len(),
            fire_sheets.len(),
            background.width,
            background.height
        );

        Ok(Self {
            player_sheets: Arc::new(player_sheets),
            fire_sheets: Arc::new(fire_sheets),
            block,
            background,
            images: vec![block_image, background_image],
        })
    }

    /// Every image that needs a GPU texture.
    pub fn all_images(&self) -> impl Iterator<Item = &SheetImage> {
        self.player_sheets
            .images()
            .iter()
            .chain(self.fire_sheets.images())
            .chain(&self.images)
    }
}

/// Backgrounds are tiled as-is, without upscaling.
fn load_background(path: &Path) -> Result<(SheetImage, Frame), String> {
    let image = load_image(path)?;
    let key: Arc<str> = Arc::from(BACKGROUND_TEXTURE);
    let frame = Frame::whole(Arc::clone(&key), &image)?;
    Ok((SheetImage { key, image }, frame))
}

/// Solid in-memory assets with the stock sizes.
#[cfg(test)]
pub(crate) fn test_assets() -> GameAssets {
    use image::{Rgba, RgbaImage};

    let fire_sheets =
        crate::sheet::solid_sheets(&[("hit", 4), ("off", 1), ("on", 8)], 16, 32, false);
    let block_image = RgbaImage::from_pixel(96, 96, Rgba([90, 160, 60, 255]));
    let block = Frame::whole(Arc::from(TERRAIN_TEXTURE), &block_image).expect("block frame");
    let background_image = RgbaImage::from_pixel(64, 64, Rgba([40, 60, 200, 255]));
    let background =
        Frame::whole(Arc::from(BACKGROUND_TEXTURE), &background_image).expect("background frame");
    GameAssets {
        player_sheets: crate::player::test_player_sheets(),
        fire_sheets: Arc::new(fire_sheets),
        block,
        background,
        images: vec![
            SheetImage {
                key: Arc::from(TERRAIN_TEXTURE),
                image: block_image,
            },
            SheetImage {
                key: Arc::from(BACKGROUND_TEXTURE),
                image: background_image,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "pxp_assets_test_{}_{}_{}",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
        RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
            .save(path)
            .expect("write png");
    }

    fn stock_tree(root: &Path) {
        for name in ["fall", "hit", "idle", "jump", "run"] {
            write_png(
                &root.join(PLAYER_SHEET_DIR).join(format!("{name}.png")),
                64,
                32,
            );
        }
        for name in ["hit", "off", "on"] {
            write_png(&root.join(FIRE_SHEET_DIR).join(format!("{name}.png")), 32, 32);
        }
        write_png(&root.join(TERRAIN_PATH), 192, 64);
        write_png(&root.join(BACKGROUND_DIR).join("Blue.png"), 64, 64);
    }

    #[test]
    fn loads_stock_directory_layout() {
        let root = temp_dir_path("stock");
        stock_tree(&root);
        let config = GameConfig {
            asset_root: root.clone(),
            ..GameConfig::default()
        };

        let assets = GameAssets::load(&config).expect("assets should load");
        assert_eq!(assets.player_sheets.len(), 10);
        assert_eq!(assets.fire_sheets.len(), 3);
        assert_eq!((assets.block.width, assets.block.height), (96, 96));
        assert_eq!((assets.background.width, assets.background.height), (64, 64));
        assert_eq!(assets.all_images().count(), 5 + 3 + 2);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn missing_background_is_fatal() {
        let root = temp_dir_path("no_bg");
        stock_tree(&root);
        let config = GameConfig {
            asset_root: root.clone(),
            background: "Purple.png".to_string(),
            ..GameConfig::default()
        };

        let err = GameAssets::load(&config).err().expect("missing background");
        assert!(err.contains("Purple.png"));

        let _ = fs::remove_dir_all(root);
    }
}
