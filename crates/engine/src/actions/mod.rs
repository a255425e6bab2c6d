//! Concrete action kinds and their factory.

pub mod delete_node;
pub mod edit_node;
pub mod mark_node;
pub mod move_node;
pub mod new_node;
pub mod scale_node;

pub use delete_node::DeleteNodeAction;
pub use edit_node::EditNodeAction;
pub use mark_node::MarkNodeAction;
pub use move_node::MoveAction;
pub use new_node::NewNodeAction;
pub use scale_node::ScaleNodeAction;

use net::{vec3_to_wire, NetCommand, NetOutbox};
use scene::DetachedSubtree;

use crate::action_state::ActionKind;
use crate::reversible::ReversibleAction;

/// Instantiates a fresh action of the given kind. New kinds get an arm here
/// and nowhere else.
pub fn new_action(kind: ActionKind) -> Box<dyn ReversibleAction> {
    match kind {
        ActionKind::Move => Box::new(MoveAction::new()),
        ActionKind::Scale => Box::new(ScaleNodeAction::new()),
        ActionKind::Mark => Box::new(MarkNodeAction::new()),
        ActionKind::NewNode => Box::new(NewNodeAction::new()),
        ActionKind::EditNode => Box::new(EditNodeAction::new()),
        ActionKind::DeleteNode => Box::new(DeleteNodeAction::new()),
    }
}

/// Broadcasts a restored subtree as absolute-state node creations, parents
/// before children.
pub(crate) fn push_subtree(outbox: &mut NetOutbox, subtree: &DetachedSubtree) {
    for node in &subtree.nodes {
        outbox.push(NetCommand::NewNode {
            id: node.sid.clone(),
            parent: node.parent_sid.clone(),
            label: node.label.clone(),
            position: vec3_to_wire(node.position),
            scale: vec3_to_wire(node.scale),
            half_extents: vec3_to_wire(node.half_extents),
            marked: node.marked,
        });
    }
}
