//! Outbox, inbox, and the client-side application path.
//!
//! `apply_command` is the only way remote state reaches the scene. It never
//! goes through the action machinery — remote effects are not recorded in
//! the local history and cannot be undone here (the authoring side owns
//! that).

use std::fmt;

use bevy::prelude::*;

use scene::{SceneError, SceneGraph};

use crate::frame::{decode_frame, encode_frame};
use crate::messages::{vec3_from_wire, NetCommand, NetEnvelope};
use crate::transport::NetTransport;

/// Identity of this participant; the originator marker on outgoing
/// envelopes.
#[derive(Resource)]
pub struct LocalParticipant {
    pub id: u64,
}

impl Default for LocalParticipant {
    fn default() -> Self {
        Self {
            id: rand::random::<u64>(),
        }
    }
}

/// Commands produced by local actions this frame, drained in send order.
#[derive(Resource, Default)]
pub struct NetOutbox {
    pending: Vec<NetCommand>,
    seq: u32,
}

impl NetOutbox {
    pub fn push(&mut self, command: NetCommand) {
        self.pending.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    fn next_seq(&mut self) -> u32 {
        self.seq = self.seq.wrapping_add(1);
        self.seq
    }
}

/// A command referenced ids that do not resolve locally (e.g. a race with a
/// delete). Recovered per-command: log, skip, keep going.
#[derive(Debug)]
pub enum ApplyError {
    UnknownNode(String),
    UnknownParent(String),
    Scene(SceneError),
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyError::UnknownNode(sid) => write!(f, "unknown node '{sid}'"),
            ApplyError::UnknownParent(sid) => write!(f, "unknown parent '{sid}'"),
            ApplyError::Scene(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ApplyError {}

impl From<SceneError> for ApplyError {
    fn from(e: SceneError) -> Self {
        ApplyError::Scene(e)
    }
}

/// Applies one remote command to the scene. Commands carry absolute state,
/// so applying the same command twice converges to the same result.
pub fn apply_command(graph: &mut SceneGraph, command: &NetCommand) -> Result<(), ApplyError> {
    match command {
        NetCommand::MoveNode { id, position } => {
            let node = graph
                .lookup(id)
                .ok_or_else(|| ApplyError::UnknownNode(id.clone()))?;
            if let Some(n) = graph.get_mut(node) {
                n.position = vec3_from_wire(*position);
            }
            Ok(())
        }
        NetCommand::SetParent { child, parent } => {
            let child_id = graph
                .lookup(child)
                .ok_or_else(|| ApplyError::UnknownNode(child.clone()))?;
            let parent_id = graph
                .lookup(parent)
                .ok_or_else(|| ApplyError::UnknownParent(parent.clone()))?;
            graph.set_parent(child_id, parent_id)?;
            Ok(())
        }
        NetCommand::ScaleNode { id, scale } => {
            let node = graph
                .lookup(id)
                .ok_or_else(|| ApplyError::UnknownNode(id.clone()))?;
            if let Some(n) = graph.get_mut(node) {
                n.scale = vec3_from_wire(*scale);
            }
            Ok(())
        }
        NetCommand::NewNode {
            id,
            parent,
            label,
            position,
            scale,
            half_extents,
            marked,
        } => {
            let parent_id = graph
                .lookup(parent)
                .ok_or_else(|| ApplyError::UnknownParent(parent.clone()))?;
            let node = match graph.lookup(id) {
                // Reconcile an already-present node instead of failing:
                // the duplicate arrival converges on the same state.
                Some(existing) => {
                    graph.set_parent(existing, parent_id)?;
                    existing
                }
                None => graph.spawn(
                    parent_id,
                    id.clone(),
                    label.clone(),
                    vec3_from_wire(*position),
                    vec3_from_wire(*half_extents),
                )?,
            };
            if let Some(n) = graph.get_mut(node) {
                n.label = label.clone();
                n.position = vec3_from_wire(*position);
                n.scale = vec3_from_wire(*scale);
                n.half_extents = vec3_from_wire(*half_extents);
                n.marked = *marked;
            }
            Ok(())
        }
        NetCommand::DeleteNode { id } => {
            let node = graph
                .lookup(id)
                .ok_or_else(|| ApplyError::UnknownNode(id.clone()))?;
            graph.detach(node)?;
            Ok(())
        }
        NetCommand::EditNode { id, label } => {
            let node = graph
                .lookup(id)
                .ok_or_else(|| ApplyError::UnknownNode(id.clone()))?;
            if let Some(n) = graph.get_mut(node) {
                n.label = label.clone();
            }
            Ok(())
        }
        NetCommand::MarkNode { id, on } => {
            let node = graph
                .lookup(id)
                .ok_or_else(|| ApplyError::UnknownNode(id.clone()))?;
            if let Some(n) = graph.get_mut(node) {
                n.marked = *on;
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Envelopes and sends everything local actions enqueued this frame.
pub fn flush_outbox(
    mut outbox: ResMut<NetOutbox>,
    local: Res<LocalParticipant>,
    mut transport: ResMut<NetTransport>,
) {
    if outbox.pending.is_empty() {
        return;
    }
    let commands = std::mem::take(&mut outbox.pending);
    for command in commands {
        let seq = outbox.next_seq();
        let envelope = NetEnvelope {
            requester: local.id,
            seq,
            command,
        };
        transport.0.send(encode_frame(&envelope));
    }
}

/// Drains the transport and applies remote commands to the scene.
pub fn pump_incoming(
    mut transport: ResMut<NetTransport>,
    local: Res<LocalParticipant>,
    mut graph: ResMut<SceneGraph>,
) {
    while let Some(bytes) = transport.0.try_recv() {
        let envelope = match decode_frame(&bytes) {
            Ok(env) => env,
            Err(e) => {
                warn!("Replication: dropping undecodable frame: {e}");
                continue;
            }
        };
        if envelope.requester == local.id {
            // Our own broadcast coming back around.
            continue;
        }
        if let Err(e) = apply_command(&mut graph, &envelope.command) {
            warn!(
                "Replication: skipping command from {:#x} (seq {}): {e}",
                envelope.requester, envelope.seq
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
