//! Reconciles the scene graph with renderable entities.
//!
//! Every non-root node gets a cuboid; transforms follow the graph each
//! frame. The engine's feedback queue drives drop-target highlighting, and
//! marked nodes get their own material. The render layer owns all of these
//! resources — actions only ever reference nodes by id.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use engine::{FeedbackRequest, HighlightKind, SceneFeedback};
use scene::SceneGraph;

pub struct NodeRenderPlugin;

impl Plugin for NodeRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NodeVisuals>()
            .init_resource::<HighlightStates>()
            .add_systems(Startup, setup_node_assets)
            .add_systems(Update, (drain_feedback, sync_node_visuals).chain());
    }
}

/// sid → spawned entity.
#[derive(Resource, Default)]
struct NodeVisuals {
    map: HashMap<String, Entity>,
}

/// Highlights currently requested by the engine, by sid.
#[derive(Resource, Default)]
struct HighlightStates {
    map: HashMap<String, HighlightKind>,
}

#[derive(Resource)]
struct NodeAssets {
    mesh: Handle<Mesh>,
    normal: Handle<StandardMaterial>,
    marked: Handle<StandardMaterial>,
    accept: Handle<StandardMaterial>,
    reject: Handle<StandardMaterial>,
}

fn setup_node_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(NodeAssets {
        mesh: meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
        normal: materials.add(StandardMaterial {
            base_color: Color::srgb(0.6, 0.65, 0.7),
            ..default()
        }),
        marked: materials.add(StandardMaterial {
            base_color: Color::srgb(0.9, 0.75, 0.1),
            ..default()
        }),
        accept: materials.add(StandardMaterial {
            base_color: Color::srgb(0.2, 0.8, 0.3),
            ..default()
        }),
        reject: materials.add(StandardMaterial {
            base_color: Color::srgb(0.85, 0.2, 0.2),
            ..default()
        }),
    });
}

/// Folds the engine's feedback queue into the highlight map.
fn drain_feedback(mut feedback: ResMut<SceneFeedback>, mut highlights: ResMut<HighlightStates>) {
    for request in feedback.drain() {
        match request {
            FeedbackRequest::Highlight { sid, kind } => {
                highlights.map.insert(sid, kind);
            }
            FeedbackRequest::Unhighlight { sid } => {
                highlights.map.remove(&sid);
            }
        }
    }
}

/// Spawns/updates/despawns one cuboid per scene node.
fn sync_node_visuals(
    mut commands: Commands,
    graph: Res<SceneGraph>,
    assets: Res<NodeAssets>,
    mut visuals: ResMut<NodeVisuals>,
    mut highlights: ResMut<HighlightStates>,
    mut transforms: Query<&mut Transform>,
    mut material_q: Query<&mut MeshMaterial3d<StandardMaterial>>,
) {
    let mut live: HashSet<String> = HashSet::new();

    for (id, node) in graph.iter() {
        if id == graph.root() {
            continue;
        }
        live.insert(node.sid.clone());

        let size = node.half_extents * node.scale * 2.0;
        let wanted = match highlights.map.get(&node.sid) {
            Some(HighlightKind::Accept) => assets.accept.clone(),
            Some(HighlightKind::Reject) => assets.reject.clone(),
            None if node.marked => assets.marked.clone(),
            None => assets.normal.clone(),
        };

        match visuals.map.get(&node.sid) {
            Some(&entity) => {
                if let Ok(mut transform) = transforms.get_mut(entity) {
                    transform.translation = node.position;
                    transform.scale = size;
                }
                if let Ok(mut material) = material_q.get_mut(entity) {
                    if material.0 != wanted {
                        material.0 = wanted;
                    }
                }
            }
            None => {
                let entity = commands
                    .spawn((
                        Mesh3d(assets.mesh.clone()),
                        MeshMaterial3d(wanted),
                        Transform::from_translation(node.position).with_scale(size),
                    ))
                    .id();
                visuals.map.insert(node.sid.clone(), entity);
            }
        }
    }

    // Nodes that left the graph take their entities (and stale highlight
    // state) with them.
    visuals.map.retain(|sid, entity| {
        if live.contains(sid) {
            true
        } else {
            commands.entity(*entity).despawn();
            highlights.map.remove(sid);
            false
        }
    });
}
