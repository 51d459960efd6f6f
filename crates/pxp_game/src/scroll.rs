use pxp_core::rect::Rect;

/// Horizontal side-scroll that follows the player once it walks into the
/// margin at either window edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    pub offset_x: i32,
    pub margin: i32,
    pub view_width: i32,
}

impl ScrollState {
    pub fn new(view_width: i32, margin: i32) -> Self {
        Self {
            offset_x: 0,
            margin,
            view_width,
        }
    }

    /// Shift by `x_vel` when the player is inside a margin and still heading
    /// toward that edge.
    pub fn follow(&mut self, rect: Rect, x_vel: f32) {
        let screen_left = rect.left() - self.offset_x;
        let screen_right = rect.right() - self.offset_x;
        let near_left = screen_left < self.margin && x_vel < 0.0;
        let near_right = screen_right > self.view_width - self.margin && x_vel > 0.0;
        if near_left || near_right {
            self.offset_x += x_vel as i32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_scroll_in_the_middle() {
        let mut scroll = ScrollState::new(1200, 200);
        scroll.follow(Rect::new(500, 0, 64, 64), 5.0);
        scroll.follow(Rect::new(500, 0, 64, 64), -5.0);
        assert_eq!(scroll.offset_x, 0);
    }

    #[test]
    fn scrolls_left_inside_left_margin() {
        let mut scroll = ScrollState::new(1200, 200);
        scroll.follow(Rect::new(150, 0, 64, 64), -5.0);
        assert_eq!(scroll.offset_x, -5);
    }

    #[test]
    fn margin_without_matching_direction_does_not_scroll() {
        let mut scroll = ScrollState::new(1200, 200);
        scroll.follow(Rect::new(150, 0, 64, 64), 5.0);
        scroll.follow(Rect::new(150, 0, 64, 64), 0.0);
        assert_eq!(scroll.offset_x, 0);
    }

    #[test]
    fn right_margin_uses_screen_space() {
        let mut scroll = ScrollState::new(1200, 200);
        scroll.follow(Rect::new(960, 0, 64, 64), 5.0);
        assert_eq!(scroll.offset_x, 5);

        // Same world position is no longer in the margin once scrolled.
        scroll.offset_x = 100;
        scroll.follow(Rect::new(960, 0, 64, 64), 5.0);
        assert_eq!(scroll.offset_x, 100);
    }
}
