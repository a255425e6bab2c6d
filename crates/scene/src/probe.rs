//! Pointer-ray probing against node pick boxes.
//!
//! Used both to find the node under the pointer when a grab starts and to
//! find the deepest candidate container while dragging. The root never
//! counts as a hit: dropping over empty space means "no candidate".

use bevy::prelude::*;

use crate::graph::{NodeId, SceneGraph};

/// A probe result: which node, where, and how far along the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    pub node: NodeId,
    /// World-space entry point on the node's box.
    pub point: Vec3,
    /// Ray parameter of the entry point.
    pub t: f32,
}

/// Slab test of a ray against an axis-aligned box. Returns the entry
/// parameter, clamped to 0 when the origin starts inside the box.
pub fn ray_aabb(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() < 1e-8 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let t0 = (min[axis] - o) / d;
        let t1 = (max[axis] - o) / d;
        let (near, far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        t_enter = t_enter.max(near);
        t_exit = t_exit.min(far);
        if t_enter > t_exit {
            return None;
        }
    }
    if t_exit < 0.0 {
        return None;
    }
    Some(t_enter.max(0.0))
}

/// Finds the deepest node (by hierarchy depth) whose pick box the ray hits,
/// skipping the root and, when given, the whole `exclude` subtree. Ties on
/// depth go to the nearer hit.
pub fn deepest_hit(
    scene: &SceneGraph,
    origin: Vec3,
    dir: Vec3,
    exclude: Option<NodeId>,
) -> Option<ProbeHit> {
    let mut best: Option<(usize, ProbeHit)> = None;
    for (id, _) in scene.iter() {
        if id == scene.root() {
            continue;
        }
        if let Some(ex) = exclude {
            if scene.is_descendant(id, ex) {
                continue;
            }
        }
        let Some((min, max)) = scene.world_aabb(id) else {
            continue;
        };
        let Some(t) = ray_aabb(origin, dir, min, max) else {
            continue;
        };
        let depth = scene.depth(id);
        let hit = ProbeHit {
            node: id,
            point: origin + dir * t,
            t,
        };
        let better = match &best {
            None => true,
            Some((bd, bh)) => depth > *bd || (depth == *bd && t < bh.t),
        };
        if better {
            best = Some((depth, hit));
        }
    }
    best.map(|(_, h)| h)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
