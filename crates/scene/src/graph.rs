//! Node arena and hierarchy operations.
//!
//! Nodes are stored in a slot arena; `NodeId` is a plain slot index and the
//! `index` map resolves stable string ids (the ids that travel over the
//! network) to handles. Handles are only valid while the node is alive —
//! anything that holds state across frames keeps the string id and
//! re-resolves it.

use std::collections::HashMap;
use std::fmt;

use bevy::prelude::*;

/// Stable string id of the scene root. The root always exists and can be
/// neither detached nor re-parented.
pub const ROOT_SID: &str = "root";

/// Handle to a live node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// A single node of the scene hierarchy.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Stable id, unique across the scene, used on the wire and in the UI.
    pub sid: String,
    /// Human-readable label shown next to the node.
    pub label: String,
    /// Parent handle; `None` only for the root.
    pub parent: Option<NodeId>,
    /// Children in insertion order. Append-only except through `detach`.
    pub children: Vec<NodeId>,
    /// World-space position of the node center.
    pub position: Vec3,
    /// Local scale applied to `half_extents` for picking and rendering.
    pub scale: Vec3,
    /// Unscaled half size of the node's pick box.
    pub half_extents: Vec3,
    /// Whether the node carries the user-visible mark.
    pub marked: bool,
}

/// Errors from hierarchy operations.
#[derive(Debug)]
pub enum SceneError {
    /// A node with this string id already exists.
    DuplicateId(String),
    /// No live node for the given id/handle.
    NotFound(String),
    /// Re-parenting would make a node its own ancestor.
    WouldCycle { child: String, parent: String },
    /// The root cannot be detached, re-parented, or removed.
    RootImmutable,
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::DuplicateId(sid) => write!(f, "node id '{sid}' already exists"),
            SceneError::NotFound(sid) => write!(f, "no node '{sid}'"),
            SceneError::WouldCycle { child, parent } => {
                write!(f, "parenting '{child}' under '{parent}' would create a cycle")
            }
            SceneError::RootImmutable => write!(f, "the scene root cannot be modified"),
        }
    }
}

impl std::error::Error for SceneError {}

/// One node captured by `detach`, in parent-before-child order.
#[derive(Debug, Clone)]
pub struct DetachedNode {
    pub sid: String,
    pub label: String,
    pub parent_sid: String,
    pub position: Vec3,
    pub scale: Vec3,
    pub half_extents: Vec3,
    pub marked: bool,
}

/// A subtree removed from the graph, sufficient to restore it exactly.
#[derive(Debug, Clone, Default)]
pub struct DetachedSubtree {
    /// Preorder: every node's parent appears before the node itself.
    pub nodes: Vec<DetachedNode>,
}

// ---------------------------------------------------------------------------
// SceneGraph resource
// ---------------------------------------------------------------------------

/// The shared scene state all actions operate on.
#[derive(Resource)]
pub struct SceneGraph {
    slots: Vec<Option<SceneNode>>,
    free: Vec<u32>,
    index: HashMap<String, NodeId>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a scene containing only the root node.
    pub fn new() -> Self {
        let root = SceneNode {
            sid: ROOT_SID.to_string(),
            label: "Root".to_string(),
            parent: None,
            children: Vec::new(),
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            half_extents: Vec3::ZERO,
            marked: false,
        };
        let mut index = HashMap::new();
        index.insert(ROOT_SID.to_string(), NodeId(0));
        Self {
            slots: vec![Some(root)],
            free: Vec::new(),
            index,
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        // The root always exists.
        false
    }

    pub fn lookup(&self, sid: &str) -> Option<NodeId> {
        self.index.get(sid).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.slots.get(id.idx()).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.slots.get_mut(id.idx()).and_then(|s| s.as_mut())
    }

    /// Iterates all live nodes in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|n| (NodeId(i as u32), n)))
    }

    /// Inserts a new node under `parent`.
    pub fn spawn(
        &mut self,
        parent: NodeId,
        sid: impl Into<String>,
        label: impl Into<String>,
        position: Vec3,
        half_extents: Vec3,
    ) -> Result<NodeId, SceneError> {
        let sid = sid.into();
        if self.index.contains_key(&sid) {
            return Err(SceneError::DuplicateId(sid));
        }
        if self.get(parent).is_none() {
            return Err(SceneError::NotFound(format!("parent handle {parent:?}")));
        }
        let node = SceneNode {
            sid: sid.clone(),
            label: label.into(),
            parent: Some(parent),
            children: Vec::new(),
            position,
            scale: Vec3::ONE,
            half_extents,
            marked: false,
        };
        let id = match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some(node);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(node));
                NodeId((self.slots.len() - 1) as u32)
            }
        };
        self.index.insert(sid, id);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    /// True if `node` is `ancestor` or sits somewhere below it.
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Hierarchy depth; the root has depth 0.
    pub fn depth(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(node).and_then(|n| n.parent);
        while let Some(id) = current {
            depth += 1;
            current = self.get(id).and_then(|n| n.parent);
        }
        depth
    }

    /// Re-links `child` under `new_parent`. World position is unchanged.
    pub fn set_parent(&mut self, child: NodeId, new_parent: NodeId) -> Result<(), SceneError> {
        if child == self.root {
            return Err(SceneError::RootImmutable);
        }
        let child_sid = match self.get(child) {
            Some(n) => n.sid.clone(),
            None => return Err(SceneError::NotFound(format!("{child:?}"))),
        };
        let parent_sid = match self.get(new_parent) {
            Some(n) => n.sid.clone(),
            None => return Err(SceneError::NotFound(format!("{new_parent:?}"))),
        };
        if self.is_descendant(new_parent, child) {
            return Err(SceneError::WouldCycle {
                child: child_sid,
                parent: parent_sid,
            });
        }
        let old_parent = self.get(child).and_then(|n| n.parent);
        if old_parent == Some(new_parent) {
            return Ok(());
        }
        if let Some(op) = old_parent {
            if let Some(p) = self.get_mut(op) {
                p.children.retain(|&c| c != child);
            }
        }
        if let Some(p) = self.get_mut(new_parent) {
            p.children.push(child);
        }
        if let Some(n) = self.get_mut(child) {
            n.parent = Some(new_parent);
        }
        Ok(())
    }

    /// Removes `node` and its whole subtree, returning everything needed to
    /// restore it.
    pub fn detach(&mut self, node: NodeId) -> Result<DetachedSubtree, SceneError> {
        if node == self.root {
            return Err(SceneError::RootImmutable);
        }
        if self.get(node).is_none() {
            return Err(SceneError::NotFound(format!("{node:?}")));
        }

        // Preorder walk so parents precede children in the capture.
        let mut order = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(n) = self.get(id) {
                // Reverse keeps sibling order stable in the preorder list.
                for &c in n.children.iter().rev() {
                    stack.push(c);
                }
            }
        }

        // Unlink the subtree top from its parent.
        if let Some(parent) = self.get(node).and_then(|n| n.parent) {
            if let Some(p) = self.get_mut(parent) {
                p.children.retain(|&c| c != node);
            }
        }

        // Capture handle→sid for the subtree while the nodes are still alive;
        // a captured node's parent slot is emptied before the node itself.
        let mut sid_of: HashMap<NodeId, String> = HashMap::new();
        for &id in &order {
            if let Some(n) = self.get(id) {
                sid_of.insert(id, n.sid.clone());
            }
        }

        let mut captured = DetachedSubtree::default();
        for id in order {
            let Some(n) = self.slots[id.idx()].take() else {
                continue;
            };
            let parent_sid = n
                .parent
                .and_then(|p| {
                    sid_of
                        .get(&p)
                        .cloned()
                        .or_else(|| self.get(p).map(|pn| pn.sid.clone()))
                })
                .unwrap_or_else(|| ROOT_SID.to_string());
            captured.nodes.push(DetachedNode {
                sid: n.sid.clone(),
                label: n.label,
                parent_sid,
                position: n.position,
                scale: n.scale,
                half_extents: n.half_extents,
                marked: n.marked,
            });
            self.index.remove(&n.sid);
            self.free.push(id.0);
        }
        Ok(captured)
    }

    /// Re-inserts a previously detached subtree. Fails with `NotFound` if the
    /// anchor parent has vanished in the meantime; partially restored nodes
    /// stay (their parents were restored first by construction).
    pub fn restore(&mut self, subtree: &DetachedSubtree) -> Result<(), SceneError> {
        for d in &subtree.nodes {
            let parent = self
                .lookup(&d.parent_sid)
                .ok_or_else(|| SceneError::NotFound(d.parent_sid.clone()))?;
            let id = self.spawn(parent, d.sid.clone(), d.label.clone(), d.position, d.half_extents)?;
            if let Some(n) = self.get_mut(id) {
                n.scale = d.scale;
                n.marked = d.marked;
            }
        }
        Ok(())
    }

    /// World-space bounding box of a node's pick volume.
    pub fn world_aabb(&self, id: NodeId) -> Option<(Vec3, Vec3)> {
        let n = self.get(id)?;
        let half = n.half_extents * n.scale;
        Some((n.position - half, n.position + half))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
