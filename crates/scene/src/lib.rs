//! Scene graph for NodeCity.
//!
//! A flat arena of nodes addressed by `NodeId` handles, with a string-id
//! index for lookups coming from the wire or the UI. The hierarchy lives in
//! explicit `parent`/`children` links; positions are world-space so
//! re-parenting is purely a hierarchy change.

use bevy::prelude::*;

pub mod graph;
pub mod probe;

pub use graph::{DetachedSubtree, NodeId, SceneError, SceneGraph, SceneNode};
pub use probe::{deepest_hit, ray_aabb, ProbeHit};

/// Registers the `SceneGraph` resource (a root-only scene).
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneGraph>();
    }
}
