//! Uniform scaling.
//!
//! Press on a node and drag vertically; the scale factor follows the
//! pointer's vertical travel and commits on release. A completed instance
//! seeds its successor with the node it scaled, so pressing over empty
//! space keeps manipulating the same node without re-selecting.

use bevy::prelude::*;

use net::{vec3_to_wire, NetCommand};
use scene::{deepest_hit, NodeId, SceneGraph};

use crate::action_state::ActionKind;
use crate::config::{MAX_SCALE_FACTOR, MIN_SCALE_FACTOR, SCALE_EPSILON, SCALE_PER_UNIT};
use crate::reversible::{ActionContext, ActionId, ActionProgress, ReversibleAction};

#[derive(Debug, Clone)]
struct ScaleTarget {
    sid: String,
    original_scale: Vec3,
    committed_scale: Vec3,
    /// Viewer distance to the node at gesture start.
    grab_distance: f32,
    /// Vertical reference: pointer height when the gesture started.
    start_height: f32,
}

pub struct ScaleNodeAction {
    id: ActionId,
    progress: ActionProgress,
    target: Option<ScaleTarget>,
    /// Node the previous instance scaled; pressing over empty space
    /// continues with it.
    continuation: Option<String>,
}

impl ScaleNodeAction {
    pub fn new() -> Self {
        Self::with_continuation(None)
    }

    pub fn with_continuation(continuation: Option<String>) -> Self {
        Self {
            id: ActionId::fresh(),
            progress: ActionProgress::NoEffect,
            target: None,
            continuation,
        }
    }

    fn pick_target(&self, ctx: &ActionContext) -> Option<NodeId> {
        if let Some(hit) = deepest_hit(ctx.scene, ctx.pointer.origin, ctx.pointer.dir, None) {
            return Some(hit.node);
        }
        self.continuation
            .as_deref()
            .and_then(|sid| ctx.scene.lookup(sid))
    }

    fn set_scale(graph: &mut SceneGraph, sid: &str, scale: Vec3) {
        let Some(node) = graph.lookup(sid) else {
            debug!("Scale: node '{sid}' vanished, scale not applied");
            return;
        };
        if let Some(n) = graph.get_mut(node) {
            n.scale = scale;
        }
    }
}

impl Default for ScaleNodeAction {
    fn default() -> Self {
        Self::new()
    }
}

impl ReversibleAction for ScaleNodeAction {
    fn id(&self) -> ActionId {
        self.id
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Scale
    }

    fn progress(&self) -> ActionProgress {
        self.progress
    }

    fn deactivate(&mut self, ctx: &mut ActionContext) {
        // Suspended mid-gesture: put the original scale back.
        if self.progress == ActionProgress::Completed {
            return;
        }
        if let Some(target) = self.target.take() {
            Self::set_scale(ctx.scene, &target.sid, target.original_scale);
            self.progress = ActionProgress::NoEffect;
        }
    }

    fn update(&mut self, ctx: &mut ActionContext) -> bool {
        match &mut self.target {
            None => {
                if !(ctx.pointer.valid && ctx.pointer.just_pressed) {
                    return false;
                }
                let Some(node) = self.pick_target(ctx) else {
                    return false;
                };
                let Some(n) = ctx.scene.get(node) else {
                    return false;
                };
                let grab_distance = (n.position - ctx.pointer.origin).length();
                self.target = Some(ScaleTarget {
                    sid: n.sid.clone(),
                    original_scale: n.scale,
                    committed_scale: n.scale,
                    grab_distance,
                    start_height: ctx.pointer.point_along(grab_distance).y,
                });
                false
            }
            Some(target) => {
                let Some(node) = ctx.scene.lookup(&target.sid) else {
                    debug!(
                        "Scale: node '{}' vanished mid-gesture, completing without effect",
                        target.sid
                    );
                    if self.progress == ActionProgress::InProgress {
                        self.progress = ActionProgress::Completed;
                    }
                    return true;
                };

                let travel = ctx.pointer.point_along(target.grab_distance).y - target.start_height;
                let factor =
                    (1.0 + travel * SCALE_PER_UNIT).clamp(MIN_SCALE_FACTOR, MAX_SCALE_FACTOR);
                let scale = target.original_scale * factor;

                if ctx.pointer.pressed {
                    if ctx.pointer.valid {
                        if (factor - 1.0).abs() > SCALE_EPSILON {
                            self.progress = ActionProgress::InProgress;
                        }
                        target.committed_scale = scale;
                        if let Some(n) = ctx.scene.get_mut(node) {
                            n.scale = scale;
                        }
                    }
                    false
                } else {
                    if (factor - 1.0).abs() <= SCALE_EPSILON {
                        // Nothing actually changed; revert and vanish from
                        // the history.
                        if let Some(n) = ctx.scene.get_mut(node) {
                            n.scale = target.original_scale;
                        }
                        self.progress = ActionProgress::NoEffect;
                        return true;
                    }
                    target.committed_scale = scale;
                    if let Some(n) = ctx.scene.get_mut(node) {
                        n.scale = scale;
                    }
                    self.progress = ActionProgress::Completed;
                    ctx.outbox.push(NetCommand::ScaleNode {
                        id: target.sid.clone(),
                        scale: vec3_to_wire(scale),
                    });
                    true
                }
            }
        }
    }

    fn undo(&mut self, ctx: &mut ActionContext) {
        let Some(target) = &self.target else {
            return;
        };
        Self::set_scale(ctx.scene, &target.sid, target.original_scale);
        ctx.outbox.push(NetCommand::ScaleNode {
            id: target.sid.clone(),
            scale: vec3_to_wire(target.original_scale),
        });
    }

    fn redo(&mut self, ctx: &mut ActionContext) {
        let Some(target) = &self.target else {
            return;
        };
        Self::set_scale(ctx.scene, &target.sid, target.committed_scale);
        ctx.outbox.push(NetCommand::ScaleNode {
            id: target.sid.clone(),
            scale: vec3_to_wire(target.committed_scale),
        });
    }

    fn changed_objects(&self) -> Vec<String> {
        self.target
            .as_ref()
            .map(|t| vec![t.sid.clone()])
            .unwrap_or_default()
    }

    fn new_instance(&self) -> Box<dyn ReversibleAction> {
        // Seed the successor with our node so the user can keep scaling it.
        let continuation = self
            .target
            .as_ref()
            .map(|t| t.sid.clone())
            .or_else(|| self.continuation.clone());
        Box::new(Self::with_continuation(continuation))
    }
}
