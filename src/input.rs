/*!
Keyboard intent derivation.

The host routes raw key press/release events into [`InputManager::set_key_state`];
`update()` turns the current key map into a normalized movement-intent vector,
a turn axis, and a one-shot jump request. The key map is an owned field, not
a process-wide singleton, so two managers never alias state.
*/

use std::collections::HashMap;

use crate::collision::types::Vec3;

/// The keys the controller cares about. Hosts map their own key codes onto
/// these (e.g. both `KeyW` and `ArrowUp` to [`Key::Forward`] variants).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Shift,
}

#[derive(Default)]
pub struct InputManager {
    keys: HashMap<Key, bool>,
    direction: Vec3,
    turn_axis: f32,
    jump_requested: bool,
    can_jump: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw key transition from the host's event layer.
    #[inline]
    pub fn set_key_state(&mut self, key: Key, pressed: bool) {
        self.keys.insert(key, pressed);
    }

    #[inline]
    fn down(&self, key: Key) -> bool {
        self.keys.get(&key).copied().unwrap_or(false)
    }

    fn axis(&self, positive: [Key; 2], negative: [Key; 2]) -> f32 {
        let pos = positive.into_iter().any(|k| self.down(k));
        let neg = negative.into_iter().any(|k| self.down(k));
        (pos as i32 - neg as i32) as f32
    }

    /// Derive this frame's intent from the key map.
    ///
    /// - `direction.x`: strafe, A/Left minus D/Right.
    /// - `direction.z`: forward, W/Up minus S/Down.
    /// - Normalized when nonzero; a zero-length intent stays the zero
    ///   vector (no division by zero, no movement that frame).
    /// - While shift is held, the strafe axis is suppressed: Left/Right
    ///   become the turn axis instead.
    /// - A Space press while `can_jump` raises the jump request and clears
    ///   `can_jump` immediately, so holding the key cannot re-trigger.
    pub fn update(&mut self) {
        let forward = self.axis([Key::W, Key::ArrowUp], [Key::S, Key::ArrowDown]);

        if self.down(Key::Shift) {
            self.turn_axis = self.axis([Key::ArrowLeft, Key::A], [Key::ArrowRight, Key::D]);
            self.direction = Vec3::new(0.0, 0.0, forward);
        } else {
            self.turn_axis = 0.0;
            let strafe = self.axis([Key::A, Key::ArrowLeft], [Key::D, Key::ArrowRight]);
            self.direction = Vec3::new(strafe, 0.0, forward);
        }

        if self.direction.norm_squared() > 0.0 {
            self.direction.normalize_mut();
        }

        if self.down(Key::Space) && self.can_jump {
            self.jump_requested = true;
            self.can_jump = false;
        }
    }

    /// Normalized movement intent derived by the last `update()`.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Turn intent in -1..=1; nonzero only while shift-turning.
    #[inline]
    pub fn turn_axis(&self) -> f32 {
        self.turn_axis
    }

    /// Returns true exactly once per jump request (read-and-clear).
    pub fn consume_jump(&mut self) -> bool {
        if self.jump_requested {
            self.jump_requested = false;
            return true;
        }
        false
    }

    /// Landing feedback from the collision pass: re-arms the jump.
    #[inline]
    pub fn set_can_jump(&mut self, can_jump: bool) {
        self.can_jump = can_jump;
    }
}
