//! Action history: the linear undo log and the frame-driven systems around
//! it.
//!
//! One action is foreground at a time and gets ticked once per frame. When
//! it reports completion it becomes a history entry (unless it never had an
//! effect) and a fresh instance of the same kind takes its place, so the
//! user keeps acting without re-selecting. Entries form a classic linear
//! undo log: a cursor splits applied from undone, undo/redo move it, and a
//! new completion truncates everything past it — no branching, no
//! coalescing.
//!
//! All history mutation funnels through the methods here, called only from
//! the frame-update systems below.

use bevy::prelude::*;

use scene::SceneGraph;

use net::{NetOutbox, NetSet};

use crate::action_state::{
    ActionStateChanged, CurrentAction, SelectActionEvent,
};
use crate::actions::edit_node::EditRequest;
use crate::actions::new_node::NodeIdAllocator;
use crate::actions::new_action;
use crate::config::MAX_HISTORY;
use crate::feedback::SceneFeedback;
use crate::keybindings::KeyBindings;
use crate::oracle::Oracle;
use crate::pointer::PointerState;
use crate::reversible::{ActionContext, ActionId, ActionProgress, ReversibleAction};

// ---------------------------------------------------------------------------
// ActionHistory resource
// ---------------------------------------------------------------------------

/// Ordered log of completed actions plus the current foreground action.
///
/// `cursor` counts the applied entries: `entries[..cursor]` are applied,
/// `entries[cursor..]` are undone-but-redoable.
#[derive(Resource, Default)]
pub struct ActionHistory {
    entries: Vec<Box<dyn ReversibleAction>>,
    cursor: usize,
    foreground: Option<Box<dyn ReversibleAction>>,
}

impl ActionHistory {
    /// Makes `action` the foreground action. The previous foreground is
    /// deactivated and dropped; everything past the cursor loses its
    /// redoability.
    pub fn execute(&mut self, mut action: Box<dyn ReversibleAction>, ctx: &mut ActionContext) {
        if let Some(mut fg) = self.foreground.take() {
            fg.deactivate(ctx);
        }
        self.entries.truncate(self.cursor);
        action.initialize(ctx);
        action.activate(ctx);
        self.foreground = Some(action);
    }

    /// Ticks the foreground action once. On completion the action is pushed
    /// as an applied entry — unless it never had an observable effect, in
    /// which case it is discarded — and a fresh instance of the same kind
    /// chains in as the new foreground.
    pub fn update(&mut self, ctx: &mut ActionContext) {
        let Some(mut fg) = self.foreground.take() else {
            return;
        };
        if !fg.update(ctx) {
            self.foreground = Some(fg);
            return;
        }
        fg.deactivate(ctx);
        let mut next = fg.new_instance();
        if fg.progress() == ActionProgress::NoEffect {
            debug!("Action completed without effect, not recorded");
        } else {
            self.entries.truncate(self.cursor);
            self.entries.push(fg);
            self.cursor += 1;
            if self.entries.len() > MAX_HISTORY {
                self.entries.remove(0);
                self.cursor -= 1;
            }
        }
        next.initialize(ctx);
        next.activate(ctx);
        self.foreground = Some(next);
    }

    /// Undoes the entry just below the cursor. No-op at the bottom of the
    /// log or while the foreground action is mid-gesture.
    pub fn undo(&mut self, ctx: &mut ActionContext) {
        if self.foreground_in_progress() {
            debug!("Undo ignored while an action is in progress");
            return;
        }
        if self.cursor == 0 {
            info!("Nothing left to undo");
            return;
        }
        self.cursor -= 1;
        self.entries[self.cursor].undo(ctx);
    }

    /// Redoes the entry at the cursor. No-op at the top of the log or while
    /// the foreground action is mid-gesture.
    pub fn redo(&mut self, ctx: &mut ActionContext) {
        if self.foreground_in_progress() {
            debug!("Redo ignored while an action is in progress");
            return;
        }
        if self.cursor == self.entries.len() {
            info!("Nothing left to redo");
            return;
        }
        self.entries[self.cursor].redo(ctx);
        self.cursor += 1;
    }

    /// Swaps an entry in place, wherever it sits. Applied entries stay
    /// applied; undone entries stay undone.
    pub fn replace(
        &mut self,
        old: ActionId,
        new_action: Box<dyn ReversibleAction>,
        from_network: bool,
    ) -> bool {
        match self.entries.iter().position(|a| a.id() == old) {
            Some(i) => {
                debug!(
                    "History entry {old:?} replaced (network originated: {from_network})"
                );
                self.entries[i] = new_action;
                true
            }
            None => false,
        }
    }

    /// Excises an entry by id wherever it currently sits. The cursor shifts
    /// down when an applied entry goes away.
    pub fn remove_action(&mut self, id: ActionId) -> bool {
        match self.entries.iter().position(|a| a.id() == id) {
            Some(i) => {
                self.entries.remove(i);
                if i < self.cursor {
                    self.cursor -= 1;
                }
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn entries(&self) -> &[Box<dyn ReversibleAction>] {
        &self.entries
    }

    pub fn foreground(&self) -> Option<&dyn ReversibleAction> {
        self.foreground.as_deref()
    }

    fn foreground_in_progress(&self) -> bool {
        self.foreground
            .as_ref()
            .is_some_and(|fg| fg.progress() == ActionProgress::InProgress)
    }
}

// ---------------------------------------------------------------------------
// Events for triggering undo/redo from keyboard input
// ---------------------------------------------------------------------------

/// Marker event: the user wants to undo.
#[derive(Event)]
pub struct UndoRequested;

/// Marker event: the user wants to redo.
#[derive(Event)]
pub struct RedoRequested;

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Keyboard listener: Ctrl+Z -> UndoRequested, Ctrl+Y / Ctrl+Shift+Z ->
/// RedoRequested.
///
/// Uses `Option<Res<...>>` so the system is a no-op in headless tests where
/// Bevy's InputPlugin (and thus ButtonInput<KeyCode>) is not present.
pub fn keyboard_undo_redo(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    bindings: Res<KeyBindings>,
    mut undo_events: EventWriter<UndoRequested>,
    mut redo_events: EventWriter<RedoRequested>,
) {
    let Some(keys) = keys else { return };

    // Check the shifted redo variant before plain Ctrl+Z, since it is the
    // more specific chord.
    if bindings.redo_alt.just_pressed(&keys) {
        redo_events.send(RedoRequested);
    } else if bindings.undo.just_pressed(&keys) {
        undo_events.send(UndoRequested);
    }

    if bindings.redo.just_pressed(&keys) {
        redo_events.send(RedoRequested);
    }
}

/// Startup: make the default action kind the foreground action so the user
/// can act from the first frame.
#[allow(clippy::too_many_arguments)]
pub fn bootstrap_foreground_action(
    current: Res<CurrentAction>,
    mut history: ResMut<ActionHistory>,
    mut graph: ResMut<SceneGraph>,
    pointer: Res<PointerState>,
    oracle: Res<Oracle>,
    mut outbox: ResMut<NetOutbox>,
    mut feedback: ResMut<SceneFeedback>,
    mut ids: ResMut<NodeIdAllocator>,
    mut edit: ResMut<EditRequest>,
) {
    let mut ctx = ActionContext {
        scene: &mut graph,
        pointer: &pointer,
        oracle: oracle.0.as_ref(),
        outbox: &mut outbox,
        feedback: &mut feedback,
        ids: &mut ids,
        edit: &mut edit,
    };
    history.execute(new_action(current.kind), &mut ctx);
}

/// Funnel for action selection: updates `CurrentAction`, notifies observers,
/// and swaps in a fresh foreground instance.
#[allow(clippy::too_many_arguments)]
pub fn apply_selected_action(
    mut events: EventReader<SelectActionEvent>,
    mut current: ResMut<CurrentAction>,
    mut changed: EventWriter<ActionStateChanged>,
    mut history: ResMut<ActionHistory>,
    mut graph: ResMut<SceneGraph>,
    pointer: Res<PointerState>,
    oracle: Res<Oracle>,
    mut outbox: ResMut<NetOutbox>,
    mut feedback: ResMut<SceneFeedback>,
    mut ids: ResMut<NodeIdAllocator>,
    mut edit: ResMut<EditRequest>,
) {
    let mut ctx = ActionContext {
        scene: &mut graph,
        pointer: &pointer,
        oracle: oracle.0.as_ref(),
        outbox: &mut outbox,
        feedback: &mut feedback,
        ids: &mut ids,
        edit: &mut edit,
    };
    for SelectActionEvent(kind) in events.read() {
        current.kind = *kind;
        changed.send(ActionStateChanged { kind: *kind });
        history.execute(new_action(*kind), &mut ctx);
    }
}

/// Ticks the foreground action once per frame.
#[allow(clippy::too_many_arguments)]
pub fn tick_foreground_action(
    mut history: ResMut<ActionHistory>,
    mut graph: ResMut<SceneGraph>,
    pointer: Res<PointerState>,
    oracle: Res<Oracle>,
    mut outbox: ResMut<NetOutbox>,
    mut feedback: ResMut<SceneFeedback>,
    mut ids: ResMut<NodeIdAllocator>,
    mut edit: ResMut<EditRequest>,
) {
    let mut ctx = ActionContext {
        scene: &mut graph,
        pointer: &pointer,
        oracle: oracle.0.as_ref(),
        outbox: &mut outbox,
        feedback: &mut feedback,
        ids: &mut ids,
        edit: &mut edit,
    };
    history.update(&mut ctx);
}

/// Processes undo requests.
#[allow(clippy::too_many_arguments)]
pub fn process_undo(
    mut events: EventReader<UndoRequested>,
    mut history: ResMut<ActionHistory>,
    mut graph: ResMut<SceneGraph>,
    pointer: Res<PointerState>,
    oracle: Res<Oracle>,
    mut outbox: ResMut<NetOutbox>,
    mut feedback: ResMut<SceneFeedback>,
    mut ids: ResMut<NodeIdAllocator>,
    mut edit: ResMut<EditRequest>,
) {
    let mut ctx = ActionContext {
        scene: &mut graph,
        pointer: &pointer,
        oracle: oracle.0.as_ref(),
        outbox: &mut outbox,
        feedback: &mut feedback,
        ids: &mut ids,
        edit: &mut edit,
    };
    for _ in events.read() {
        history.undo(&mut ctx);
    }
}

/// Processes redo requests.
#[allow(clippy::too_many_arguments)]
pub fn process_redo(
    mut events: EventReader<RedoRequested>,
    mut history: ResMut<ActionHistory>,
    mut graph: ResMut<SceneGraph>,
    pointer: Res<PointerState>,
    oracle: Res<Oracle>,
    mut outbox: ResMut<NetOutbox>,
    mut feedback: ResMut<SceneFeedback>,
    mut ids: ResMut<NodeIdAllocator>,
    mut edit: ResMut<EditRequest>,
) {
    let mut ctx = ActionContext {
        scene: &mut graph,
        pointer: &pointer,
        oracle: oracle.0.as_ref(),
        outbox: &mut outbox,
        feedback: &mut feedback,
        ids: &mut ids,
        edit: &mut edit,
    };
    for _ in events.read() {
        history.redo(&mut ctx);
    }
}

/// Registers the engine systems in frame order, between the replication
/// bridge's receive and send phases.
pub(crate) fn add_history_systems(app: &mut App) {
    app.add_systems(Startup, bootstrap_foreground_action);
    app.add_systems(
        Update,
        (
            keyboard_undo_redo,
            apply_selected_action,
            tick_foreground_action,
            process_undo,
            process_redo,
        )
            .chain()
            .after(NetSet::Receive)
            .before(NetSet::Send),
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
