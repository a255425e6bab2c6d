//! The reversible-action contract.
//!
//! An action is a little state machine: it exists with `NoEffect` until its
//! first observable scene change, runs `InProgress` while ticking, and ends
//! `Completed` when its termination condition is met. `Completed` is
//! terminal — undo/redo reverse or reapply the finalized effect, they never
//! re-enter the earlier states.

use std::sync::atomic::{AtomicU64, Ordering};

use scene::SceneGraph;

use net::NetOutbox;

use crate::action_state::ActionKind;
use crate::actions::new_node::NodeIdAllocator;
use crate::feedback::SceneFeedback;
use crate::oracle::ReparentOracle;
use crate::pointer::PointerState;

/// Lifecycle state of an action instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionProgress {
    /// Constructed, but nothing in the scene has changed yet.
    NoEffect,
    /// At least one observable change happened; not yet finalized.
    InProgress,
    /// Finalized. Terminal for the instance.
    Completed,
}

/// Opaque per-instance identity, unique for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(u64);

static NEXT_ACTION_ID: AtomicU64 = AtomicU64::new(1);

impl ActionId {
    pub fn fresh() -> Self {
        Self(NEXT_ACTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Everything an action may touch, passed explicitly into every lifecycle
/// call. No action reaches for globals.
pub struct ActionContext<'a> {
    pub scene: &'a mut SceneGraph,
    pub pointer: &'a PointerState,
    pub oracle: &'a dyn ReparentOracle,
    pub outbox: &'a mut NetOutbox,
    pub feedback: &'a mut SceneFeedback,
    pub ids: &'a mut NodeIdAllocator,
    pub edit: &'a mut crate::actions::edit_node::EditRequest,
}

/// The capability interface every action kind implements.
///
/// Calls arrive in a fixed order: `initialize` once, then any number of
/// `activate`/`update`.../`deactivate` rounds, then — once completed —
/// alternating `undo`/`redo` driven by the history.
pub trait ReversibleAction: Send + Sync {
    fn id(&self) -> ActionId;

    fn kind(&self) -> ActionKind;

    fn progress(&self) -> ActionProgress;

    /// One-time setup before the first activation. Must not mutate the scene.
    fn initialize(&mut self, _ctx: &mut ActionContext) {}

    /// The action became the foreground interactive action.
    fn activate(&mut self, _ctx: &mut ActionContext) {}

    /// The action stopped being the foreground action. May run multiple
    /// times; an in-flight gesture should revert its preview state here.
    fn deactivate(&mut self, _ctx: &mut ActionContext) {}

    /// Per-frame tick while foreground. Returns `true` once the action has
    /// reached its terminal, committable point.
    fn update(&mut self, ctx: &mut ActionContext) -> bool;

    /// Restores the touched objects to their state before this action's
    /// first observable effect. Only meaningful once per completed action
    /// before a matching `redo`.
    fn undo(&mut self, ctx: &mut ActionContext);

    /// Reapplies exactly the effect the most recent `undo` reversed.
    fn redo(&mut self, ctx: &mut ActionContext);

    /// Stable ids of the objects this action mutated. May be empty.
    fn changed_objects(&self) -> Vec<String>;

    /// A fresh instance of the same kind, optionally seeded with a
    /// continuation (e.g. the node the finished instance manipulated).
    fn new_instance(&self) -> Box<dyn ReversibleAction>;
}
