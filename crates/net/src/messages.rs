//! Wire message schema.
//!
//! Every command is a flat record of primitives: node ids as strings,
//! positions/scales as `[f32; 3]`, flags as bools. No nested object graphs —
//! new fields can be appended without breaking older readers of the same
//! format version. Commands carry absolute state, not deltas, so applying
//! one twice converges.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A single replicated scene mutation.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
pub enum NetCommand {
    /// Place a node at an absolute world position.
    MoveNode { id: String, position: [f32; 3] },
    /// Re-link a node under a new parent.
    SetParent { child: String, parent: String },
    /// Set a node's absolute local scale.
    ScaleNode { id: String, scale: [f32; 3] },
    /// Create (or, when the id already exists, reconcile) a node.
    NewNode {
        id: String,
        parent: String,
        label: String,
        position: [f32; 3],
        scale: [f32; 3],
        half_extents: [f32; 3],
        marked: bool,
    },
    /// Remove a node and its subtree.
    DeleteNode { id: String },
    /// Set a node's label.
    EditNode { id: String, label: String },
    /// Set a node's mark flag.
    MarkNode { id: String, on: bool },
}

/// A command stamped with its originator.
///
/// `requester` is the marker that lets the producer recognize and skip its
/// own broadcast when the transport echoes it back. `seq` is diagnostic
/// only; the bridge never reorders on it.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
pub struct NetEnvelope {
    pub requester: u64,
    pub seq: u32,
    pub command: NetCommand,
}

pub fn vec3_to_wire(v: Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

pub fn vec3_from_wire(v: [f32; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}
