//! Tick-driven sprite animation.
//!
//! Every animated entity owns a plain integer tick counter that advances once
//! per fixed simulation step. The frame shown is
//! `(tick / delay) % sequence_len`, so timing is fully deterministic and
//! independent of wall-clock time.
//!
//! The counter is wrapped back to zero once `tick / delay` reaches the number
//! of sequences registered for the entity. That bound is unrelated to the
//! length of the sequence being shown; it only keeps the counter small. Frame
//! selection stays correct either way because of the modulo.

/// Index of the frame to show for `tick` in a sequence of `len` frames.
pub fn frame_index(tick: u32, delay: u32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (tick / delay.max(1)) as usize % len
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickAnimator {
    pub tick: u32,
    pub delay: u32,
}

impl TickAnimator {
    pub fn new(delay: u32) -> Self {
        Self {
            tick: 0,
            delay: delay.max(1),
        }
    }

    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn reset(&mut self) {
        self.tick = 0;
    }

    /// Wrap the counter when it has run past `registered` sequences worth of
    /// frames, then return the index into a sequence of `len` frames.
    pub fn select(&mut self, registered: usize, len: usize) -> usize {
        if (self.tick / self.delay) as usize >= registered {
            self.tick = 0;
        }
        frame_index(self.tick, self.delay, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_divides_then_wraps() {
        assert_eq!(frame_index(0, 3, 4), 0);
        assert_eq!(frame_index(2, 3, 4), 0);
        assert_eq!(frame_index(3, 3, 4), 1);
        assert_eq!(frame_index(11, 3, 4), 3);
        assert_eq!(frame_index(12, 3, 4), 0);
    }

    #[test]
    fn frame_index_matches_formula_for_all_ticks() {
        for len in 1..6usize {
            for tick in 0..200u32 {
                assert_eq!(frame_index(tick, 10, len), (tick as usize / 10) % len);
            }
        }
    }

    #[test]
    fn frame_index_of_empty_sequence_is_zero() {
        assert_eq!(frame_index(17, 3, 0), 0);
    }

    #[test]
    fn frame_index_is_non_decreasing_within_one_cycle() {
        let len = 11;
        let delay = 3;
        let mut last = 0;
        for tick in 0..(len as u32 * delay) {
            let idx = frame_index(tick, delay, len);
            assert!(idx >= last);
            last = idx;
        }
    }

    #[test]
    fn select_wraps_counter_at_registered_sequence_count() {
        let mut anim = TickAnimator::new(10);
        anim.tick = 29;
        assert_eq!(anim.select(3, 8), 2);
        assert_eq!(anim.tick, 29);

        anim.tick = 30;
        assert_eq!(anim.select(3, 8), 0);
        assert_eq!(anim.tick, 0);
    }

    #[test]
    fn zero_delay_is_clamped() {
        let anim = TickAnimator::new(0);
        assert_eq!(anim.delay, 1);
    }
}
