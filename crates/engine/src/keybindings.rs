//! Keyboard shortcut bindings.
//!
//! Systems read from the `KeyBindings` resource instead of hardcoding
//! `KeyCode` values, so an embedding app can rebind without touching the
//! engine.

use bevy::prelude::*;

/// A key plus required modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyBinding {
    /// A binding with no modifiers.
    pub const fn simple(key: KeyCode) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
        }
    }

    /// A binding that requires Ctrl.
    pub const fn ctrl(key: KeyCode) -> Self {
        Self {
            key,
            ctrl: true,
            shift: false,
        }
    }

    /// Check if this binding fired this frame (just_pressed for the key,
    /// modifiers must be held).
    pub fn just_pressed(self, keys: &ButtonInput<KeyCode>) -> bool {
        if !keys.just_pressed(self.key) {
            return false;
        }
        let ctrl_held = keys.pressed(KeyCode::ControlLeft) || keys.pressed(KeyCode::ControlRight);
        let shift_held = keys.pressed(KeyCode::ShiftLeft) || keys.pressed(KeyCode::ShiftRight);
        ctrl_held == self.ctrl && shift_held == self.shift
    }
}

/// The engine's configurable shortcuts.
#[derive(Resource)]
pub struct KeyBindings {
    pub undo: KeyBinding,
    pub redo: KeyBinding,
    /// Ctrl+Shift+Z, the common alternative to Ctrl+Y.
    pub redo_alt: KeyBinding,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            undo: KeyBinding::ctrl(KeyCode::KeyZ),
            redo: KeyBinding::ctrl(KeyCode::KeyY),
            redo_alt: KeyBinding {
                key: KeyCode::KeyZ,
                ctrl: true,
                shift: true,
            },
        }
    }
}
