//! Keyboard state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` returns true every tick the key
//!   is physically down. Movement samples this once per tick.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only until
//!   `end_frame()`, which the main loop calls only after at least one fixed
//!   simulation step has consumed them. Jumping is driven by `just_pressed`,
//!   so a press landing on a frame with zero simulation steps is not lost.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Escape,
    Space,
    F3,
    F4,
    A,
    D,
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// True if any of `keys` is held.
    pub fn any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.is_held(*k))
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    /// True if any of `keys` went down since the last `end_frame`.
    pub fn any_just_pressed(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.is_just_pressed(*k))
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// Forget every key, e.g. when the window loses focus and release events
    /// will never arrive.
    pub fn release_all(&mut self) {
        let held: Vec<Key> = self.held.iter().copied().collect();
        for key in held {
            self.key_up(key);
        }
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}
