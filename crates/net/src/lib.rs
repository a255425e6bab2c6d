//! Network replication bridge.
//!
//! Completed actions enqueue flat state commands into the `NetOutbox`; the
//! bridge wraps them into checksummed envelopes and hands them to the
//! transport, which fans them out to every participant including the origin.
//! Incoming envelopes are applied to the local scene unless they carry our
//! own requester id. Applying is per-command and forgiving: a command whose
//! target has vanished is logged and skipped, never aborting the batch.

use bevy::prelude::*;

pub mod bridge;
pub mod frame;
pub mod messages;
pub mod transport;

pub use bridge::{apply_command, ApplyError, LocalParticipant, NetOutbox};
pub use frame::{decode_frame, encode_frame, WireError};
pub use messages::{vec3_from_wire, vec3_to_wire, NetCommand, NetEnvelope};
pub use transport::{Loopback, MemoryHub, NetTransport, Transport};

/// Phases of the per-frame replication work. Local action ticking belongs
/// between them: remote state first, then broadcast what this frame did.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetSet {
    /// Drain the transport and apply remote commands.
    Receive,
    /// Envelope and send everything the local frame produced.
    Send,
}

pub struct NetPlugin;

impl Plugin for NetPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LocalParticipant>()
            .init_resource::<NetOutbox>()
            .init_resource::<NetTransport>()
            .configure_sets(Update, (NetSet::Receive, NetSet::Send).chain())
            .add_systems(
                Update,
                (
                    bridge::pump_incoming.in_set(NetSet::Receive),
                    bridge::flush_outbox.in_set(NetSet::Send),
                ),
            );
    }
}
