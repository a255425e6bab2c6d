//! Pointer interface.
//!
//! The engine never talks to winit. Whatever input device is in use, the
//! embedding app reduces it to one world-space ray plus button edges per
//! frame; the test harness writes this resource directly.

use bevy::prelude::*;

/// One frame of pointer input, in world space.
#[derive(Resource, Debug, Clone, Default)]
pub struct PointerState {
    /// Ray origin (the viewer).
    pub origin: Vec3,
    /// Normalized ray direction.
    pub dir: Vec3,
    /// False when the pointer is outside the window or over UI.
    pub valid: bool,
    pub pressed: bool,
    pub just_pressed: bool,
    pub just_released: bool,
}

impl PointerState {
    /// Point along the pointer ray at the given distance from the viewer.
    pub fn point_along(&self, distance: f32) -> Vec3 {
        self.origin + self.dir * distance
    }
}
