//! # TestScene — headless integration-test harness for the action engine
//!
//! Wraps a `bevy::app::App` with MinimalPlugins + the engine and net plugins
//! so tests can drive the pointer, tick frames, and assert on the resulting
//! scene/history state without a window or renderer.

use bevy::app::App;
use bevy::prelude::*;

use net::transport::MemoryEndpoint;
use net::{LocalParticipant, MemoryHub, NetPlugin, NetTransport};
use scene::{SceneGraph, ScenePlugin};

use crate::action_state::{ActionKind, SelectActionEvent};
use crate::actions::edit_node::EditRequest;
use crate::history::{ActionHistory, RedoRequested, UndoRequested};
use crate::pointer::PointerState;
use crate::EnginePlugin;

/// A headless Bevy App wrapping the engine for integration testing.
pub struct TestScene {
    app: App,
}

impl TestScene {
    /// An empty scene (just the root) with the default Move action already
    /// foregrounded.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins((ScenePlugin, NetPlugin, EnginePlugin));
        // Deterministic participant id so wire assertions can filter.
        app.insert_resource(LocalParticipant { id: 1 });
        // Run one update so Startup systems execute (the foreground action
        // bootstraps).
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // World setup (builder pattern — consumes and returns Self)
    // -----------------------------------------------------------------------

    /// Adds a node under the given parent sid ("root" for top level).
    pub fn with_node(mut self, sid: &str, parent: &str, position: Vec3, half_extents: Vec3) -> Self {
        let mut graph = self.app.world_mut().resource_mut::<SceneGraph>();
        let parent = graph.lookup(parent).expect("parent sid exists");
        graph
            .spawn(parent, sid, sid.to_uppercase(), position, half_extents)
            .expect("node spawn succeeds");
        self
    }

    /// Swaps the transport for one endpoint of a two-endpoint hub and
    /// returns the other endpoint, so tests can observe the frames this
    /// scene broadcasts.
    pub fn capture_wire(&mut self) -> MemoryEndpoint {
        let mut endpoints = MemoryHub::endpoints(2);
        let observer = endpoints.pop().expect("two endpoints");
        let local = endpoints.pop().expect("two endpoints");
        self.app
            .world_mut()
            .insert_resource(NetTransport(Box::new(local)));
        observer
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Advances n frames.
    pub fn tick(&mut self, n: usize) {
        for _ in 0..n {
            self.app.update();
        }
    }

    /// Switches the current action kind (ticks one frame).
    pub fn select(&mut self, kind: ActionKind) {
        self.app.world_mut().send_event(SelectActionEvent(kind));
        self.app.update();
    }

    fn aim(pointer: &mut PointerState, target: Vec3) {
        let origin = target + Vec3::new(0.0, 0.0, 30.0);
        pointer.origin = origin;
        pointer.dir = (target - origin).normalize();
        pointer.valid = true;
    }

    /// Press the pointer aimed at a world position (one frame).
    pub fn press_at(&mut self, target: Vec3) {
        {
            let mut pointer = self.app.world_mut().resource_mut::<PointerState>();
            Self::aim(&mut pointer, target);
            pointer.pressed = true;
            pointer.just_pressed = true;
        }
        self.app.update();
        self.app
            .world_mut()
            .resource_mut::<PointerState>()
            .just_pressed = false;
    }

    /// Drag the held pointer toward a world position (one frame).
    pub fn drag_to(&mut self, target: Vec3) {
        {
            let mut pointer = self.app.world_mut().resource_mut::<PointerState>();
            Self::aim(&mut pointer, target);
        }
        self.app.update();
    }

    /// Release the pointer (one frame).
    pub fn release(&mut self) {
        {
            let mut pointer = self.app.world_mut().resource_mut::<PointerState>();
            pointer.pressed = false;
            pointer.just_released = true;
        }
        self.app.update();
        self.app
            .world_mut()
            .resource_mut::<PointerState>()
            .just_released = false;
    }

    /// Requests an undo (one frame).
    pub fn undo(&mut self) {
        self.app.world_mut().send_event(UndoRequested);
        self.app.update();
    }

    /// Requests a redo (one frame).
    pub fn redo(&mut self) {
        self.app.world_mut().send_event(RedoRequested);
        self.app.update();
    }

    /// Files a label edit for the next edit-action tick (one frame).
    pub fn request_edit(&mut self, sid: &str, label: &str) {
        {
            let mut edit = self.app.world_mut().resource_mut::<EditRequest>();
            edit.target = Some(sid.to_string());
            edit.label = label.to_string();
        }
        self.app.update();
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn graph(&self) -> &SceneGraph {
        self.app.world().resource::<SceneGraph>()
    }

    pub fn history(&self) -> &ActionHistory {
        self.app.world().resource::<ActionHistory>()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    /// Parent sid of a node, if the node exists.
    pub fn parent_of(&self, sid: &str) -> Option<String> {
        let graph = self.graph();
        let node = graph.lookup(sid)?;
        let parent = graph.get(node)?.parent?;
        graph.get(parent).map(|p| p.sid.clone())
    }

    pub fn position_of(&self, sid: &str) -> Option<Vec3> {
        let graph = self.graph();
        graph.lookup(sid).and_then(|n| graph.get(n)).map(|n| n.position)
    }

    pub fn scale_of(&self, sid: &str) -> Option<Vec3> {
        let graph = self.graph();
        graph.lookup(sid).and_then(|n| graph.get(n)).map(|n| n.scale)
    }

    pub fn label_of(&self, sid: &str) -> Option<String> {
        let graph = self.graph();
        graph
            .lookup(sid)
            .and_then(|n| graph.get(n))
            .map(|n| n.label.clone())
    }

    pub fn is_marked(&self, sid: &str) -> Option<bool> {
        let graph = self.graph();
        graph.lookup(sid).and_then(|n| graph.get(n)).map(|n| n.marked)
    }
}

impl Default for TestScene {
    fn default() -> Self {
        Self::new()
    }
}
