//! Mark toggling.
//!
//! Click a node to flip its mark flag. The action completes immediately;
//! undo flips it back.

use bevy::prelude::*;

use net::NetCommand;
use scene::deepest_hit;

use crate::action_state::ActionKind;
use crate::reversible::{ActionContext, ActionId, ActionProgress, ReversibleAction};

pub struct MarkNodeAction {
    id: ActionId,
    progress: ActionProgress,
    sid: Option<String>,
    /// The mark state this action committed.
    on: bool,
}

impl MarkNodeAction {
    pub fn new() -> Self {
        Self {
            id: ActionId::fresh(),
            progress: ActionProgress::NoEffect,
            sid: None,
            on: false,
        }
    }

    fn set_mark(&self, ctx: &mut ActionContext, on: bool) {
        let Some(sid) = &self.sid else {
            return;
        };
        let Some(node) = ctx.scene.lookup(sid) else {
            debug!("Mark: node '{sid}' vanished, mark not applied");
            return;
        };
        if let Some(n) = ctx.scene.get_mut(node) {
            n.marked = on;
        }
        ctx.outbox.push(NetCommand::MarkNode {
            id: sid.clone(),
            on,
        });
    }
}

impl Default for MarkNodeAction {
    fn default() -> Self {
        Self::new()
    }
}

impl ReversibleAction for MarkNodeAction {
    fn id(&self) -> ActionId {
        self.id
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Mark
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
        let Some(n) = ctx.scene.get_mut(hit.node) else {
            return false;
        };
        n.marked = !n.marked;
        self.on = n.marked;
        self.sid = Some(n.sid.clone());
        self.progress = ActionProgress::Completed;
        ctx.outbox.push(NetCommand::MarkNode {
            id: n.sid.clone(),
            on: self.on,
        });
        true
    }

    fn undo(&mut self, ctx: &mut ActionContext) {
        let on = self.on;
        self.set_mark(ctx, !on);
    }

    fn redo(&mut self, ctx: &mut ActionContext) {
        let on = self.on;
        self.set_mark(ctx, on);
    }

    fn changed_objects(&self) -> Vec<String> {
        self.sid.clone().map(|s| vec![s]).unwrap_or_default()
    }

    fn new_instance(&self) -> Box<dyn ReversibleAction> {
        Box::new(Self::new())
    }
}
