//! Node creation.
//!
//! Click a container: a child node appears at the hit point and the action
//! completes in the same tick. Undo detaches it (with whatever grew under
//! it in the meantime); redo restores the captured subtree.

use bevy::prelude::*;

use net::{vec3_to_wire, NetCommand};
use scene::{deepest_hit, DetachedSubtree, SceneGraph};

use crate::action_state::ActionKind;
use crate::actions::push_subtree;
use crate::config::NEW_NODE_HALF_EXTENTS;
use crate::reversible::{ActionContext, ActionId, ActionProgress, ReversibleAction};

/// Hands out collision-free stable ids for locally created nodes. The
/// random prefix keeps participants from minting the same id.
#[derive(Resource)]
pub struct NodeIdAllocator {
    prefix: u32,
    next: u64,
}

impl Default for NodeIdAllocator {
    fn default() -> Self {
        Self {
            prefix: rand::random::<u32>(),
            next: 0,
        }
    }
}

impl NodeIdAllocator {
    pub fn fresh(&mut self, graph: &SceneGraph) -> String {
        loop {
            let sid = format!("node-{:08x}-{}", self.prefix, self.next);
            self.next += 1;
            if graph.lookup(&sid).is_none() {
                return sid;
            }
        }
    }
}

pub struct NewNodeAction {
    id: ActionId,
    progress: ActionProgress,
    created_sid: Option<String>,
    parent_sid: String,
    position: Vec3,
    /// Subtree captured by the last undo, restored verbatim by redo.
    undone: Option<DetachedSubtree>,
}

impl NewNodeAction {
    pub fn new() -> Self {
        Self {
            id: ActionId::fresh(),
            progress: ActionProgress::NoEffect,
            created_sid: None,
            parent_sid: String::new(),
            position: Vec3::ZERO,
            undone: None,
        }
    }
}

impl Default for NewNodeAction {
    fn default() -> Self {
        Self::new()
    }
}

impl ReversibleAction for NewNodeAction {
    fn id(&self) -> ActionId {
        self.id
    }

    fn kind(&self) -> ActionKind {
        ActionKind::NewNode
    }

    fn progress(&self) -> ActionProgress {
        self.progress
    }

    fn update(&mut self, ctx: &mut ActionContext) -> bool {
        if !(ctx.pointer.valid && ctx.pointer.just_pressed) {
            return false;
        }
        let Some(hit) = deepest_hit(ctx.scene, ctx.pointer.origin, ctx.pointer.dir, None) else {
            return false;
        };
        let Some(container) = ctx.scene.get(hit.node) else {
            return false;
        };
        let parent_sid = container.sid.clone();
        let sid = ctx.ids.fresh(ctx.scene);
        match ctx
            .scene
            .spawn(hit.node, sid.clone(), "Node", hit.point, NEW_NODE_HALF_EXTENTS)
        {
            Ok(_) => {
                self.created_sid = Some(sid.clone());
                self.parent_sid = parent_sid.clone();
                self.position = hit.point;
                self.progress = ActionProgress::Completed;
                ctx.outbox.push(NetCommand::NewNode {
                    id: sid,
                    parent: parent_sid,
                    label: "Node".to_string(),
                    position: vec3_to_wire(hit.point),
                    scale: [1.0, 1.0, 1.0],
                    half_extents: vec3_to_wire(NEW_NODE_HALF_EXTENTS),
                    marked: false,
                });
                true
            }
            Err(e) => {
                warn!("New node: spawn failed: {e}");
                false
            }
        }
    }

    fn undo(&mut self, ctx: &mut ActionContext) {
        let Some(sid) = &self.created_sid else {
            return;
        };
        let Some(node) = ctx.scene.lookup(sid) else {
            debug!("New node: '{sid}' vanished, nothing to undo");
            return;
        };
        match ctx.scene.detach(node) {
            Ok(subtree) => {
                ctx.outbox.push(NetCommand::DeleteNode { id: sid.clone() });
                self.undone = Some(subtree);
            }
            Err(e) => warn!("New node: undo failed for '{sid}': {e}"),
        }
    }

    fn redo(&mut self, ctx: &mut ActionContext) {
        let Some(subtree) = self.undone.take() else {
            return;
        };
        match ctx.scene.restore(&subtree) {
            Ok(()) => push_subtree(ctx.outbox, &subtree),
            Err(e) => warn!("New node: redo failed: {e}"),
        }
    }

    fn changed_objects(&self) -> Vec<String> {
        self.created_sid.clone().map(|s| vec![s]).unwrap_or_default()
    }

    fn new_instance(&self) -> Box<dyn ReversibleAction> {
        Box::new(Self::new())
    }
}
