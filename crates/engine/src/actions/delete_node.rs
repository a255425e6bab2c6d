//! Node deletion.
//!
//! Click a node (the root is unreachable): the whole subtree is detached
//! and kept aside. Undo restores it exactly; redo detaches it again.

use bevy::prelude::*;

use net::NetCommand;
use scene::{deepest_hit, DetachedSubtree};

use crate::action_state::ActionKind;
use crate::actions::push_subtree;
use crate::reversible::{ActionContext, ActionId, ActionProgress, ReversibleAction};

pub struct DeleteNodeAction {
    id: ActionId,
    progress: ActionProgress,
    deleted_sid: Option<String>,
    /// Captured on delete and on every redo; consumed by restore.
    subtree: Option<DetachedSubtree>,
    touched: Vec<String>,
}

impl DeleteNodeAction {
    pub fn new() -> Self {
        Self {
            id: ActionId::fresh(),
            progress: ActionProgress::NoEffect,
            deleted_sid: None,
            subtree: None,
            touched: Vec::new(),
        }
    }
}

impl Default for DeleteNodeAction {
    fn default() -> Self {
        Self::new()
    }
}

impl ReversibleAction for DeleteNodeAction {
    fn id(&self) -> ActionId {
        self.id
    }

    fn kind(&self) -> ActionKind {
        ActionKind::DeleteNode
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
        let Some(sid) = ctx.scene.get(hit.node).map(|n| n.sid.clone()) else {
            return false;
        };
        match ctx.scene.detach(hit.node) {
            Ok(subtree) => {
                self.touched = subtree.nodes.iter().map(|n| n.sid.clone()).collect();
                self.subtree = Some(subtree);
                self.deleted_sid = Some(sid.clone());
                self.progress = ActionProgress::Completed;
                ctx.outbox.push(NetCommand::DeleteNode { id: sid });
                true
            }
            Err(e) => {
                warn!("Delete: could not detach '{sid}': {e}");
                false
            }
        }
    }

    fn undo(&mut self, ctx: &mut ActionContext) {
        let Some(subtree) = self.subtree.take() else {
            return;
        };
        match ctx.scene.restore(&subtree) {
            Ok(()) => push_subtree(ctx.outbox, &subtree),
            Err(e) => warn!("Delete: undo could not restore subtree: {e}"),
        }
    }

    fn redo(&mut self, ctx: &mut ActionContext) {
        let Some(sid) = &self.deleted_sid else {
            return;
        };
        let Some(node) = ctx.scene.lookup(sid) else {
            debug!("Delete: '{sid}' vanished, nothing to redo");
            return;
        };
        match ctx.scene.detach(node) {
            Ok(subtree) => {
                self.subtree = Some(subtree);
                ctx.outbox.push(NetCommand::DeleteNode { id: sid.clone() });
            }
            Err(e) => warn!("Delete: redo failed for '{sid}': {e}"),
        }
    }

    fn changed_objects(&self) -> Vec<String> {
        self.touched.clone()
    }

    fn new_instance(&self) -> Box<dyn ReversibleAction> {
        Box::new(Self::new())
    }
}
