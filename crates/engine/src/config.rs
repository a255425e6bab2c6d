use bevy::prelude::*;

/// Maximum number of completed actions kept in the history.
pub const MAX_HISTORY: usize = 100;

/// Minimum pointer travel (world units) before a drag counts as having an
/// observable effect.
pub const DRAG_EPSILON: f32 = 1e-3;

/// Pick-box half size given to newly created nodes.
pub const NEW_NODE_HALF_EXTENTS: Vec3 = Vec3::splat(0.5);

/// Scale factor change per world unit of vertical pointer travel.
pub const SCALE_PER_UNIT: f32 = 0.25;

/// Clamp range for the uniform scale gesture, relative to the original scale.
pub const MIN_SCALE_FACTOR: f32 = 0.1;
pub const MAX_SCALE_FACTOR: f32 = 10.0;

/// Minimum relative scale change before the gesture counts as an effect.
pub const SCALE_EPSILON: f32 = 1e-3;
