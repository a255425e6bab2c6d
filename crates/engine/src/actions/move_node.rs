//! Grab/move coordinator.
//!
//! The drag protocol per instance:
//!   1. Grab — press over a draggable node (never the root). Captures the
//!      original parent, position, and scale, plus the viewer distance to
//!      the node at grab time.
//!   2. Drag — each tick the node follows the pointer ray at the captured
//!      distance. A probe ray finds the deepest candidate container under
//!      the pointer (the grabbed subtree excluded); when the candidate
//!      changes, the oracle is consulted and an accepted candidate gets a
//!      non-committing preview re-parent with highlight feedback. No
//!      candidate reverts the preview to the original parent.
//!   3. Drop — release commits the active preview as the final parent. With
//!      no active preview the node snaps back to its pre-grab parent and
//!      transform, and the whole gesture counts as having no effect.
//!
//! Undo restores the original parent and transform in one step; redo
//! reapplies the committed parent and position.

use bevy::prelude::*;

use net::{vec3_to_wire, NetCommand};
use scene::{deepest_hit, SceneGraph};

use crate::action_state::ActionKind;
use crate::config::DRAG_EPSILON;
use crate::oracle::HighlightKind;
use crate::reversible::{ActionContext, ActionId, ActionProgress, ReversibleAction};

/// Everything remembered about the node being dragged.
#[derive(Debug, Clone)]
struct GrabbedNode {
    sid: String,
    original_parent_sid: String,
    original_position: Vec3,
    original_scale: Vec3,
    /// Last position the user dragged the node to; the committed position.
    current_position: Vec3,
    /// Viewer distance to the node at grab time; held for the whole drag.
    grab_distance: f32,
    /// Currently previewed (highlighted, tentatively applied) parent.
    previewed_sid: Option<String>,
    /// Parent committed at drop; what redo reapplies.
    committed_parent_sid: Option<String>,
}

pub struct MoveAction {
    id: ActionId,
    progress: ActionProgress,
    grabbed: Option<GrabbedNode>,
}

impl MoveAction {
    pub fn new() -> Self {
        Self {
            id: ActionId::fresh(),
            progress: ActionProgress::NoEffect,
            grabbed: None,
        }
    }

    /// Re-links the grabbed node to its original parent if a preview moved
    /// it elsewhere, clearing the highlight.
    fn revert_preview(grabbed: &mut GrabbedNode, ctx: &mut ActionContext) {
        if let Some(old) = grabbed.previewed_sid.take() {
            ctx.feedback.unhighlight(&old);
        }
        let (Some(node), Some(original)) = (
            ctx.scene.lookup(&grabbed.sid),
            ctx.scene.lookup(&grabbed.original_parent_sid),
        ) else {
            return;
        };
        if let Err(e) = ctx.scene.set_parent(node, original) {
            warn!("Move: could not revert preview of '{}': {e}", grabbed.sid);
        }
    }

    fn try_grab(&mut self, ctx: &mut ActionContext) {
        if !(ctx.pointer.valid && ctx.pointer.just_pressed) {
            return;
        }
        // The probe never reports the root, so the root can never be
        // grabbed and this action stays in NoEffect for such presses.
        let Some(hit) = deepest_hit(ctx.scene, ctx.pointer.origin, ctx.pointer.dir, None) else {
            return;
        };
        let Some(node) = ctx.scene.get(hit.node) else {
            return;
        };
        let parent_sid = node
            .parent
            .and_then(|p| ctx.scene.get(p))
            .map(|p| p.sid.clone())
            .unwrap_or_else(|| scene::graph::ROOT_SID.to_string());
        self.grabbed = Some(GrabbedNode {
            sid: node.sid.clone(),
            original_parent_sid: parent_sid,
            original_position: node.position,
            original_scale: node.scale,
            current_position: node.position,
            grab_distance: (node.position - ctx.pointer.origin).length(),
            previewed_sid: None,
            committed_parent_sid: None,
        });
    }

    /// One drag tick: follow the pointer, refresh the candidate preview.
    fn drag(&mut self, ctx: &mut ActionContext) {
        let Some(grabbed) = &mut self.grabbed else {
            return;
        };
        if !ctx.pointer.valid {
            return;
        }
        let Some(node) = ctx.scene.lookup(&grabbed.sid) else {
            return;
        };

        let new_position = ctx.pointer.point_along(grabbed.grab_distance);
        if (new_position - grabbed.original_position).length() > DRAG_EPSILON {
            self.progress = ActionProgress::InProgress;
        }
        grabbed.current_position = new_position;
        if let Some(n) = ctx.scene.get_mut(node) {
            n.position = new_position;
        }

        let candidate = deepest_hit(ctx.scene, ctx.pointer.origin, ctx.pointer.dir, Some(node))
            .map(|hit| hit.node);
        match candidate {
            Some(target) => {
                let Some(target_sid) = ctx.scene.get(target).map(|t| t.sid.clone()) else {
                    return;
                };
                if grabbed.previewed_sid.as_deref() == Some(target_sid.as_str()) {
                    return;
                }
                let assessment = ctx.oracle.assess(ctx.scene, node, target);
                if !assessment.allowed {
                    // Show the refusal but keep the previous preview state.
                    ctx.feedback.highlight(&target_sid, HighlightKind::Reject);
                    return;
                }
                if let Some(old) = grabbed.previewed_sid.take() {
                    ctx.feedback.unhighlight(&old);
                }
                let parent_changes =
                    ctx.scene.get(node).and_then(|n| n.parent) != Some(target);
                match ctx.scene.set_parent(node, target) {
                    Ok(()) => {
                        if parent_changes {
                            self.progress = ActionProgress::InProgress;
                        }
                        ctx.feedback.highlight(&target_sid, assessment.highlight);
                        grabbed.previewed_sid = Some(target_sid);
                    }
                    Err(e) => {
                        debug!("Move: preview re-parent rejected: {e}");
                    }
                }
            }
            None => {
                if grabbed.previewed_sid.is_some() {
                    Self::revert_preview(grabbed, ctx);
                }
            }
        }
    }

    /// Pointer released: commit the active preview, or revert entirely.
    fn drop_grabbed(&mut self, ctx: &mut ActionContext) {
        let Some(grabbed) = &mut self.grabbed else {
            return;
        };
        match grabbed.previewed_sid.take() {
            // A click that never moved anything (the preview can only be the
            // original parent then) is not worth committing.
            Some(parent_sid) if self.progress == ActionProgress::InProgress => {
                ctx.feedback.unhighlight(&parent_sid);
                grabbed.committed_parent_sid = Some(parent_sid.clone());
                self.progress = ActionProgress::Completed;
                ctx.outbox.push(NetCommand::SetParent {
                    child: grabbed.sid.clone(),
                    parent: parent_sid,
                });
                ctx.outbox.push(NetCommand::MoveNode {
                    id: grabbed.sid.clone(),
                    position: vec3_to_wire(grabbed.current_position),
                });
            }
            Some(parent_sid) => {
                ctx.feedback.unhighlight(&parent_sid);
                if let Some(node) = ctx.scene.lookup(&grabbed.sid) {
                    if let Some(n) = ctx.scene.get_mut(node) {
                        n.position = grabbed.original_position;
                        n.scale = grabbed.original_scale;
                    }
                }
                self.progress = ActionProgress::NoEffect;
            }
            None => {
                // No container below: the node returns to its original
                // parent and transform, and nothing happened overall.
                if let Some(node) = ctx.scene.lookup(&grabbed.sid) {
                    if let Some(n) = ctx.scene.get_mut(node) {
                        n.position = grabbed.original_position;
                        n.scale = grabbed.original_scale;
                    }
                }
                self.progress = ActionProgress::NoEffect;
            }
        }
    }

    fn restore(graph: &mut SceneGraph, sid: &str, parent_sid: &str, position: Vec3, scale: Option<Vec3>) {
        let Some(node) = graph.lookup(sid) else {
            debug!("Move: node '{sid}' vanished, nothing to restore");
            return;
        };
        match graph.lookup(parent_sid) {
            Some(parent) => {
                if let Err(e) = graph.set_parent(node, parent) {
                    warn!("Move: could not re-parent '{sid}' onto '{parent_sid}': {e}");
                }
            }
            None => warn!("Move: parent '{parent_sid}' vanished, keeping current parent of '{sid}'"),
        }
        if let Some(n) = graph.get_mut(node) {
            n.position = position;
            if let Some(scale) = scale {
                n.scale = scale;
            }
        }
    }
}

impl Default for MoveAction {
    fn default() -> Self {
        Self::new()
    }
}

impl ReversibleAction for MoveAction {
    fn id(&self) -> ActionId {
        self.id
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Move
    }

    fn progress(&self) -> ActionProgress {
        self.progress
    }

    fn deactivate(&mut self, ctx: &mut ActionContext) {
        // Being suspended mid-drag must not leave a tentative hierarchy
        // behind.
        if self.progress == ActionProgress::Completed {
            return;
        }
        if let Some(grabbed) = &mut self.grabbed {
            Self::revert_preview(grabbed, ctx);
            let original_position = grabbed.original_position;
            let original_scale = grabbed.original_scale;
            if let Some(node) = ctx.scene.lookup(&grabbed.sid) {
                if let Some(n) = ctx.scene.get_mut(node) {
                    n.position = original_position;
                    n.scale = original_scale;
                }
            }
            self.grabbed = None;
            self.progress = ActionProgress::NoEffect;
        }
    }

    fn update(&mut self, ctx: &mut ActionContext) -> bool {
        match &self.grabbed {
            None => {
                self.try_grab(ctx);
                false
            }
            Some(grabbed) => {
                // A concurrent delete may have taken the node away.
                if ctx.scene.lookup(&grabbed.sid).is_none() {
                    debug!(
                        "Move: grabbed node '{}' vanished mid-drag, completing without effect",
                        grabbed.sid
                    );
                    if self.progress == ActionProgress::InProgress {
                        self.progress = ActionProgress::Completed;
                    }
                    return true;
                }
                if ctx.pointer.pressed {
                    self.drag(ctx);
                    false
                } else {
                    self.drop_grabbed(ctx);
                    true
                }
            }
        }
    }

    fn undo(&mut self, ctx: &mut ActionContext) {
        let Some(grabbed) = &self.grabbed else {
            return;
        };
        Self::restore(
            ctx.scene,
            &grabbed.sid,
            &grabbed.original_parent_sid,
            grabbed.original_position,
            Some(grabbed.original_scale),
        );
        ctx.outbox.push(NetCommand::SetParent {
            child: grabbed.sid.clone(),
            parent: grabbed.original_parent_sid.clone(),
        });
        ctx.outbox.push(NetCommand::MoveNode {
            id: grabbed.sid.clone(),
            position: vec3_to_wire(grabbed.original_position),
        });
    }

    fn redo(&mut self, ctx: &mut ActionContext) {
        let Some(grabbed) = &self.grabbed else {
            return;
        };
        let Some(parent_sid) = &grabbed.committed_parent_sid else {
            return;
        };
        Self::restore(
            ctx.scene,
            &grabbed.sid,
            parent_sid,
            grabbed.current_position,
            None,
        );
        ctx.outbox.push(NetCommand::SetParent {
            child: grabbed.sid.clone(),
            parent: parent_sid.clone(),
        });
        ctx.outbox.push(NetCommand::MoveNode {
            id: grabbed.sid.clone(),
            position: vec3_to_wire(grabbed.current_position),
        });
    }

    fn changed_objects(&self) -> Vec<String> {
        self.grabbed
            .as_ref()
            .map(|g| vec![g.sid.clone()])
            .unwrap_or_default()
    }

    fn new_instance(&self) -> Box<dyn ReversibleAction> {
        Box::new(Self::new())
    }
}
