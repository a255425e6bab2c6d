//! Transport seam.
//!
//! The bridge only needs "send this frame to every participant, me included"
//! and "hand me the next pending frame". A real socket layer implements the
//! same trait; the two implementations here cover single-process use:
//! `Loopback` (offline mode, frames echo straight back) and `MemoryHub`
//! (N endpoints over shared queues, per-sender FIFO, used by the
//! replication tests).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bevy::prelude::*;

/// Frame-level transport. Delivery is per-sender FIFO; nothing more is
/// assumed by the bridge.
pub trait Transport: Send + Sync {
    /// Fan the frame out to every participant, including the sender.
    fn send(&mut self, frame: Vec<u8>);
    /// Next pending frame for this participant, if any.
    fn try_recv(&mut self) -> Option<Vec<u8>>;
}

/// Offline-mode transport: every sent frame comes straight back.
#[derive(Default)]
pub struct Loopback {
    queue: VecDeque<Vec<u8>>,
}

impl Transport for Loopback {
    fn send(&mut self, frame: Vec<u8>) {
        self.queue.push_back(frame);
    }

    fn try_recv(&mut self) -> Option<Vec<u8>> {
        self.queue.pop_front()
    }
}

type SharedQueues = Arc<Mutex<Vec<VecDeque<Vec<u8>>>>>;

/// In-process broadcast hub. `endpoints(n)` hands out one endpoint per
/// participant; a send enqueues a copy on every endpoint's queue.
pub struct MemoryHub;

impl MemoryHub {
    pub fn endpoints(n: usize) -> Vec<MemoryEndpoint> {
        let shared: SharedQueues = Arc::new(Mutex::new(vec![VecDeque::new(); n]));
        (0..n)
            .map(|me| MemoryEndpoint {
                shared: Arc::clone(&shared),
                me,
            })
            .collect()
    }
}

/// One participant's view of a `MemoryHub`.
pub struct MemoryEndpoint {
    shared: SharedQueues,
    me: usize,
}

impl Transport for MemoryEndpoint {
    fn send(&mut self, frame: Vec<u8>) {
        let mut queues = self.shared.lock().unwrap_or_else(|e| e.into_inner());
        for q in queues.iter_mut() {
            q.push_back(frame.clone());
        }
    }

    fn try_recv(&mut self) -> Option<Vec<u8>> {
        let mut queues = self.shared.lock().unwrap_or_else(|e| e.into_inner());
        queues[self.me].pop_front()
    }
}

/// The transport in use, boxed behind the seam. Defaults to offline mode.
#[derive(Resource)]
pub struct NetTransport(pub Box<dyn Transport>);

impl Default for NetTransport {
    fn default() -> Self {
        Self(Box::new(Loopback::default()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
