//! Label editing.
//!
//! The UI writes the pending edit into the `EditRequest` resource; the
//! foreground edit action consumes it on its next tick. Undo/redo swap the
//! old and new labels.

use bevy::prelude::*;

use net::NetCommand;

use crate::action_state::ActionKind;
use crate::reversible::{ActionContext, ActionId, ActionProgress, ReversibleAction};

/// A label change requested by the UI, waiting to be applied.
#[derive(Resource, Default)]
pub struct EditRequest {
    pub target: Option<String>,
    pub label: String,
}

pub struct EditNodeAction {
    id: ActionId,
    progress: ActionProgress,
    sid: Option<String>,
    old_label: String,
    new_label: String,
}

impl EditNodeAction {
    pub fn new() -> Self {
        Self {
            id: ActionId::fresh(),
            progress: ActionProgress::NoEffect,
            sid: None,
            old_label: String::new(),
            new_label: String::new(),
        }
    }

    fn apply_label(&self, ctx: &mut ActionContext, label: &str) {
        let Some(sid) = &self.sid else {
            return;
        };
        let Some(node) = ctx.scene.lookup(sid) else {
            debug!("Edit: node '{sid}' vanished, label not applied");
            return;
        };
        if let Some(n) = ctx.scene.get_mut(node) {
            n.label = label.to_string();
        }
        ctx.outbox.push(NetCommand::EditNode {
            id: sid.clone(),
            label: label.to_string(),
        });
    }
}

impl Default for EditNodeAction {
    fn default() -> Self {
        Self::new()
    }
}

impl ReversibleAction for EditNodeAction {
    fn id(&self) -> ActionId {
        self.id
    }

    fn kind(&self) -> ActionKind {
        ActionKind::EditNode
    }

    fn progress(&self) -> ActionProgress {
        self.progress
    }

    fn update(&mut self, ctx: &mut ActionContext) -> bool {
        let Some(sid) = ctx.edit.target.take() else {
            return false;
        };
        let label = std::mem::take(&mut ctx.edit.label);
        let Some(node) = ctx.scene.lookup(&sid) else {
            debug!("Edit: requested node '{sid}' does not exist, ignoring");
            return false;
        };
        let Some(n) = ctx.scene.get_mut(node) else {
            return false;
        };
        if n.label == label {
            return false;
        }
        self.old_label = std::mem::replace(&mut n.label, label.clone());
        self.new_label = label.clone();
        self.sid = Some(sid.clone());
        self.progress = ActionProgress::Completed;
        ctx.outbox.push(NetCommand::EditNode { id: sid, label });
        true
    }

    fn undo(&mut self, ctx: &mut ActionContext) {
        let old = self.old_label.clone();
        self.apply_label(ctx, &old);
    }

    fn redo(&mut self, ctx: &mut ActionContext) {
        let new = self.new_label.clone();
        self.apply_label(ctx, &new);
    }

    fn changed_objects(&self) -> Vec<String> {
        self.sid.clone().map(|s| vec![s]).unwrap_or_default()
    }

    fn new_instance(&self) -> Box<dyn ReversibleAction> {
        Box::new(Self::new())
    }
}
