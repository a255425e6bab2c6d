//! Re-parenting oracle.
//!
//! During a drag the coordinator asks "would parenting this node there be
//! valid, and how should the target be highlighted?" The answer comes from
//! an external analyzer in the full system; the oracle only ever sees
//! hypothetical state — nothing is committed until the drop.

use bevy::prelude::*;

use scene::{NodeId, SceneGraph};

/// Visual verdict for a previewed drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    /// The re-parenting would be accepted.
    Accept,
    /// The re-parenting would be refused.
    Reject,
}

/// Answer to a what-if re-parenting query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReparentAssessment {
    pub allowed: bool,
    pub highlight: HighlightKind,
}

/// The what-if consistency collaborator.
pub trait ReparentOracle: Send + Sync {
    fn assess(&self, graph: &SceneGraph, child: NodeId, new_parent: NodeId) -> ReparentAssessment;
}

/// Default oracle: structural rules only. Refuses parenting a node onto
/// itself or into its own subtree, accepts everything else.
pub struct HierarchyOracle;

impl ReparentOracle for HierarchyOracle {
    fn assess(&self, graph: &SceneGraph, child: NodeId, new_parent: NodeId) -> ReparentAssessment {
        let allowed = new_parent != child && !graph.is_descendant(new_parent, child);
        ReparentAssessment {
            allowed,
            highlight: if allowed {
                HighlightKind::Accept
            } else {
                HighlightKind::Reject
            },
        }
    }
}

/// The oracle in use, boxed so embedders can install their own analyzer.
#[derive(Resource)]
pub struct Oracle(pub Box<dyn ReparentOracle>);

impl Default for Oracle {
    fn default() -> Self {
        Self(Box::new(HierarchyOracle))
    }
}
