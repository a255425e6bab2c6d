//! Reversible-action engine for NodeCity.
//!
//! Turns discrete user intents (move, scale, add, edit, delete, mark nodes)
//! into undoable, redoable, replicated operations. One action is foreground
//! at a time and is ticked once per frame; completed actions land in the
//! `ActionHistory` and broadcast their absolute state through the `net`
//! bridge. See the module docs of `history` and `actions::move_node` for
//! the two densest pieces.

use bevy::prelude::*;

pub mod action_state;
pub mod actions;
pub mod config;
pub mod feedback;
pub mod history;
pub mod keybindings;
pub mod oracle;
pub mod pointer;
pub mod reversible;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
pub mod test_harness;

pub use action_state::{
    ActionKind, ActionStateChanged, ActionStateRegistry, ActionStateType, CurrentAction,
    RegistryEntry, RegistryError, SelectActionEvent,
};
pub use actions::new_action;
pub use feedback::{FeedbackRequest, SceneFeedback};
pub use history::{ActionHistory, RedoRequested, UndoRequested};
pub use keybindings::{KeyBinding, KeyBindings};
pub use oracle::{HierarchyOracle, HighlightKind, Oracle, ReparentAssessment, ReparentOracle};
pub use pointer::PointerState;
pub use reversible::{ActionContext, ActionId, ActionProgress, ReversibleAction};

/// Wires up the action engine: registry, history, pointer/oracle/feedback
/// seams, and the frame-order systems. Expects `net::NetPlugin` alongside it
/// for actual replication; the resources it needs are initialized here
/// either way so headless tests can run without a transport.
pub struct EnginePlugin;

impl Plugin for EnginePlugin {
    fn build(&self, app: &mut App) {
        let mut registry = ActionStateRegistry::default();
        action_state::register_default_catalog(&mut registry)
            .expect("built-in action catalog must not contain duplicate names");

        app.insert_resource(registry)
            .init_resource::<scene::SceneGraph>()
            .init_resource::<net::NetOutbox>()
            .init_resource::<ActionHistory>()
            .init_resource::<CurrentAction>()
            .init_resource::<PointerState>()
            .init_resource::<Oracle>()
            .init_resource::<SceneFeedback>()
            .init_resource::<KeyBindings>()
            .init_resource::<actions::new_node::NodeIdAllocator>()
            .init_resource::<actions::edit_node::EditRequest>()
            .add_event::<SelectActionEvent>()
            .add_event::<ActionStateChanged>()
            .add_event::<UndoRequested>()
            .add_event::<RedoRequested>();

        history::add_history_systems(app);
    }
}
