/// Integer screen-space rectangle anchored at its top-left corner.
///
/// Y grows downward, so `top() < bottom()` for any non-empty rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Move the rect so its bottom edge sits at `bottom`, keeping the height.
    pub fn set_bottom(&mut self, bottom: i32) {
        self.y = bottom - self.h;
    }

    /// Move the rect so its top edge sits at `top`, keeping the height.
    pub fn set_top(&mut self, top: i32) {
        self.y = top;
    }

    /// Same origin, new size.
    pub fn with_size(self, w: i32, h: i32) -> Self {
        Self { w, h, ..self }
    }

    /// Copy of this rect shifted by `(dx, dy)`.
    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Strict overlap test; rects that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}
