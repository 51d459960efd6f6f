//! Per-pixel collision masks.
//!
//! A mask is a bit grid with one bit per pixel of the frame it was built from.
//! Two masks collide when at least one set bit lines up once the second mask
//! is shifted by the relative offset between the two entities. This is what
//! gives pixel-accurate contact instead of bounding-box contact: transparent
//! padding around a sprite never blocks anything.

const WORD_BITS: usize = 64;

/// Alpha values strictly above this count as solid.
pub const SOLID_ALPHA_THRESHOLD: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl Mask {
    /// An all-clear mask.
    pub fn new(width: u32, height: u32) -> Self {
        let words_per_row = (width as usize).div_ceil(WORD_BITS);
        Self {
            width,
            height,
            words_per_row,
            bits: vec![0; words_per_row * height as usize],
        }
    }

    /// An all-set mask, handy for solid tiles and tests.
    pub fn filled(width: u32, height: u32) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                mask.set(x, y, true);
            }
        }
        mask
    }

    /// Build a mask from tightly packed RGBA8 pixels. A pixel is solid when its
    /// alpha is above [`SOLID_ALPHA_THRESHOLD`].
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, String> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(format!(
                "Mask source has {} bytes, expected {} for {}x{} RGBA",
                rgba.len(),
                expected,
                width,
                height
            ));
        }

        let mut mask = Self::new(width, height);
        for (i, pixel) in rgba.chunks_exact(4).enumerate() {
            if pixel[3] > SOLID_ALPHA_THRESHOLD {
                let x = (i % width as usize) as u32;
                let y = (i / width as usize) as u32;
                mask.set(x, y, true);
            }
        }
        Ok(mask)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let (word, bit) = self.locate(x, y);
        self.bits[word] & (1u64 << bit) != 0
    }

    pub fn set(&mut self, x: u32, y: u32, solid: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let (word, bit) = self.locate(x, y);
        if solid {
            self.bits[word] |= 1u64 << bit;
        } else {
            self.bits[word] &= !(1u64 << bit);
        }
    }

    /// Number of solid pixels.
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// Mirror image around the vertical axis.
    pub fn flipped_horizontal(&self) -> Self {
        let mut out = Self::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    out.set(self.width - 1 - x, y, true);
                }
            }
        }
        out
    }

    /// True when any solid pixel of `self` coincides with a solid pixel of
    /// `other`, where `other`'s top-left corner sits at `(dx, dy)` in `self`'s
    /// pixel space.
    pub fn overlaps(&self, other: &Mask, dx: i32, dy: i32) -> bool {
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (self.width as i32).min(dx + other.width as i32);
        let y1 = (self.height as i32).min(dy + other.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return false;
        }

        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x as u32, y as u32) && other.get((x - dx) as u32, (y - dy) as u32) {
                    return true;
                }
            }
        }
        false
    }

    fn locate(&self, x: u32, y: u32) -> (usize, usize) {
        let word = y as usize * self.words_per_row + x as usize / WORD_BITS;
        (word, x as usize % WORD_BITS)
    }
}
