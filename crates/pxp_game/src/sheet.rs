//! Sprite sheet loading and frame slicing.
//!
//! A sheet is a single-row strip of equal-width frames. Each frame is cut out
//! (padded with transparency if the strip ends mid-frame), upscaled with
//! Scale2x and packed into a new strip that becomes one GPU texture. Frames
//! are then UV sub-rectangles of that texture plus a collision mask built from
//! the upscaled pixels.
//!
//! Sheets loaded "both ways" register two sequences per file: `<stem>_right`
//! as drawn and `<stem>_left` mirrored. Mirroring never touches pixels; the
//! left frames reuse the right texture with swapped horizontal UVs and a
//! flipped mask.

use image::{imageops, Rgba, RgbaImage};
use pxp_core::mask::Mask;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// One drawable animation frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub texture: Arc<str>,
    /// `[u0, v0, u1, v1]`; `u0 > u1` for mirrored frames.
    pub uv: [f32; 4],
    pub width: u32,
    pub height: u32,
    pub mask: Arc<Mask>,
}

impl Frame {
    /// A frame covering the whole of `image`.
    pub fn whole(texture: Arc<str>, image: &RgbaImage) -> Result<Self, String> {
        let mask = Mask::from_rgba(image.width(), image.height(), image.as_raw())?;
        Ok(Self {
            texture,
            uv: [0.0, 0.0, 1.0, 1.0],
            width: image.width(),
            height: image.height(),
            mask: Arc::new(mask),
        })
    }

    pub fn mirrored(&self) -> Self {
        let [u0, v0, u1, v1] = self.uv;
        Self {
            texture: Arc::clone(&self.texture),
            uv: [u1, v0, u0, v1],
            width: self.width,
            height: self.height,
            mask: Arc::new(self.mask.flipped_horizontal()),
        }
    }
}

/// Decoded pixels that must be uploaded under `key` before anything that
/// references the key is drawn.
#[derive(Debug, Clone)]
pub struct SheetImage {
    pub key: Arc<str>,
    pub image: RgbaImage,
}

#[derive(Debug, Default)]
pub struct SpriteSheets {
    sequences: HashMap<String, Vec<Frame>>,
    images: Vec<SheetImage>,
}

impl SpriteSheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `.png` in `dir` as one animation, in file-name order.
    pub fn load_dir(
        dir: &Path,
        frame_width: u32,
        frame_height: u32,
        both_ways: bool,
    ) -> Result<Self, String> {
        let entries = fs::read_dir(dir).map_err(|e| {
            format!(
                "Failed to read sprite sheet directory {}: {e}",
                dir.display()
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| format!("Failed to list {}: {e}", dir.display()))?;
            let path = entry.path();
            let is_png = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if path.is_file() && is_png {
                paths.push(path);
            }
        }
        paths.sort();
        if paths.is_empty() {
            return Err(format!(
                "Sprite sheet directory {} contains no .png sheets",
                dir.display()
            ));
        }

        let group = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut sheets = Self::new();
        for path in &paths {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| format!("Sprite sheet {} has no file stem", path.display()))?;
            let image = load_image(path)?;
            let key: Arc<str> = Arc::from(format!("{group}/{stem}"));
            sheets.insert_sheet(&stem, key, &image, frame_width, frame_height, both_ways)?;
        }

        log::info!(
            "Loaded {} sprite sequences from {} ({} sheets)",
            sheets.len(),
            dir.display(),
            paths.len()
        );
        Ok(sheets)
    }

    /// Slice `sheet` into frames and register them under `name` (or
    /// `name_right` / `name_left` when `both_ways`).
    pub fn insert_sheet(
        &mut self,
        name: &str,
        key: Arc<str>,
        sheet: &RgbaImage,
        frame_width: u32,
        frame_height: u32,
        both_ways: bool,
    ) -> Result<(), String> {
        if frame_width == 0 || frame_height == 0 {
            return Err(format!("Sprite sheet '{name}' has a zero-sized frame"));
        }
        let frame_count = sheet.width().div_ceil(frame_width);
        if frame_count == 0 {
            return Err(format!("Sprite sheet '{name}' is empty"));
        }

        let scaled_w = frame_width * 2;
        let scaled_h = frame_height * 2;
        let mut strip = RgbaImage::new(scaled_w * frame_count, scaled_h);
        let mut frames = Vec::with_capacity(frame_count as usize);
        for i in 0..frame_count {
            let cell = slice_frame(sheet, i * frame_width, 0, frame_width, frame_height);
            let scaled = scale2x(&cell);
            let mask = Mask::from_rgba(scaled_w, scaled_h, scaled.as_raw())
                .map_err(|e| format!("Sprite sheet '{name}' frame {i}: {e}"))?;
            imageops::replace(&mut strip, &scaled, (i * scaled_w) as i64, 0);
            frames.push(Frame {
                texture: Arc::clone(&key),
                uv: [
                    i as f32 / frame_count as f32,
                    0.0,
                    (i + 1) as f32 / frame_count as f32,
                    1.0,
                ],
                width: scaled_w,
                height: scaled_h,
                mask: Arc::new(mask),
            });
        }

        if both_ways {
            let left = frames.iter().map(Frame::mirrored).collect();
            self.sequences.insert(format!("{name}_left"), left);
            self.sequences.insert(format!("{name}_right"), frames);
        } else {
            self.sequences.insert(name.to_string(), frames);
        }
        self.images.push(SheetImage { key, image: strip });
        Ok(())
    }

    pub fn sequence(&self, name: &str) -> Result<&[Frame], String> {
        self.sequences
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| format!("Animation '{name}' is not in the sprite sheets"))
    }

    #[allow(dead_code)]
    pub fn contains(&self, name: &str) -> bool {
        self.sequences.contains_key(name)
    }

    /// Number of registered sequences (not frames).
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn images(&self) -> &[SheetImage] {
        &self.images
    }
}

pub fn load_image(path: &Path) -> Result<RgbaImage, String> {
    let image = image::open(path)
        .map_err(|e| format!("Failed to load image {}: {e}", path.display()))?;
    Ok(image.to_rgba8())
}

/// Cut a `size`×`size` tile at `(x, y)` from the sheet at `path` and upscale it.
pub fn load_tile(
    path: &Path,
    key: Arc<str>,
    x: u32,
    y: u32,
    size: u32,
) -> Result<(SheetImage, Frame), String> {
    let sheet = load_image(path)?;
    let tile = scale2x(&slice_frame(&sheet, x, y, size, size));
    let frame = Frame::whole(Arc::clone(&key), &tile)
        .map_err(|e| format!("Tile from {}: {e}", path.display()))?;
    Ok((SheetImage { key, image: tile }, frame))
}

/// Copy a `width`×`height` region, padding whatever lies outside `sheet`
/// with transparent pixels.
fn slice_frame(sheet: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
    let mut cell = RgbaImage::new(width, height);
    if x < sheet.width() && y < sheet.height() {
        let src = imageops::crop_imm(sheet, x, y, width, height).to_image();
        imageops::replace(&mut cell, &src, 0, 0);
    }
    cell
}

/// Scale2x (EPX) pixel-art upscale. Neighbours past the border clamp to the
/// edge pixel.
pub fn scale2x(src: &RgbaImage) -> RgbaImage {
    let (w, h) = src.dimensions();
    let mut out = RgbaImage::new(w * 2, h * 2);
    if w == 0 || h == 0 {
        return out;
    }

    let at = |x: i64, y: i64| -> Rgba<u8> {
        let cx = x.clamp(0, w as i64 - 1) as u32;
        let cy = y.clamp(0, h as i64 - 1) as u32;
        *src.get_pixel(cx, cy)
    };

    for y in 0..h {
        for x in 0..w {
            let (xi, yi) = (x as i64, y as i64);
            let p = at(xi, yi);
            let a = at(xi, yi - 1);
            let b = at(xi + 1, yi);
            let c = at(xi - 1, yi);
            let d = at(xi, yi + 1);

            let e0 = if c == a && c != d && a != b { a } else { p };
            let e1 = if a == b && a != c && b != d { b } else { p };
            let e2 = if d == c && d != b && c != a { c } else { p };
            let e3 = if b == d && b != a && d != c { d } else { p };

            out.put_pixel(x * 2, y * 2, e0);
            out.put_pixel(x * 2 + 1, y * 2, e1);
            out.put_pixel(x * 2, y * 2 + 1, e2);
            out.put_pixel(x * 2 + 1, y * 2 + 1, e3);
        }
    }
    out
}

/// Sheets built in memory from fully opaque frames.
#[cfg(test)]
pub(crate) fn solid_sheets(
    sequences: &[(&str, u32)],
    frame_width: u32,
    frame_height: u32,
    both_ways: bool,
) -> SpriteSheets {
    let mut sheets = SpriteSheets::new();
    for (name, frames) in sequences {
        let image = RgbaImage::from_pixel(
            frame_width * frames,
            frame_height,
            Rgba([200, 80, 40, 255]),
        );
        sheets
            .insert_sheet(
                name,
                Arc::from(format!("test/{name}")),
                &image,
                frame_width,
                frame_height,
                both_ways,
            )
            .expect("solid sheet should slice");
    }
    sheets
}
