use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy_egui::EguiPlugin;

use scene::SceneGraph;

mod camera;
mod cursor;
mod node_render;
mod toolbar;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "NodeCity".to_string(),
                resolution: (1280.0, 720.0).into(),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .add_plugins((scene::ScenePlugin, net::NetPlugin, engine::EnginePlugin))
        .add_plugins((
            camera::CameraPlugin,
            cursor::CursorPlugin,
            node_render::NodeRenderPlugin,
            toolbar::ToolbarPlugin,
        ))
        .add_systems(Startup, seed_demo_scene)
        .run();
}

/// A small starter hierarchy so there is something to grab on first launch.
fn seed_demo_scene(mut graph: ResMut<SceneGraph>) {
    let root = graph.root();
    let spawn = |graph: &mut SceneGraph, parent, sid: &str, label: &str, pos, half| {
        graph
            .spawn(parent, sid, label, pos, half)
            .expect("demo scene ids are unique")
    };

    let west = spawn(
        &mut graph,
        root,
        "west",
        "West District",
        Vec3::new(-8.0, 1.0, 0.0),
        Vec3::new(5.0, 1.0, 5.0),
    );
    let east = spawn(
        &mut graph,
        root,
        "east",
        "East District",
        Vec3::new(8.0, 1.0, 0.0),
        Vec3::new(5.0, 1.0, 5.0),
    );
    spawn(
        &mut graph,
        west,
        "w1",
        "House W1",
        Vec3::new(-10.0, 2.5, -2.0),
        Vec3::splat(0.8),
    );
    spawn(
        &mut graph,
        west,
        "w2",
        "House W2",
        Vec3::new(-6.0, 2.5, 2.0),
        Vec3::splat(0.8),
    );
    spawn(
        &mut graph,
        east,
        "e1",
        "House E1",
        Vec3::new(8.0, 2.5, 1.0),
        Vec3::splat(0.8),
    );
    info!("Seeded demo scene with {} nodes", graph.len());
}
