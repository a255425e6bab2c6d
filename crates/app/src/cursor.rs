//! Produces the engine's `PointerState` from the desktop mouse: one world
//! ray through the cursor plus button edges, suppressed while egui wants
//! the pointer.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use engine::PointerState;
use net::NetSet;

pub struct CursorPlugin;

impl Plugin for CursorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, update_pointer_state.before(NetSet::Receive));
    }
}

/// Returns `true` when egui wants the pointer — the cursor is over a panel
/// or egui is mid-drag. World input must skip those frames to prevent
/// click-through.
fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    let ctx = contexts.ctx_mut();
    ctx.wants_pointer_input() || ctx.is_pointer_over_area()
}

pub fn update_pointer_state(
    windows: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut contexts: EguiContexts,
    mut pointer: ResMut<PointerState>,
) {
    pointer.just_pressed = false;
    pointer.just_released = buttons.just_released(MouseButton::Left);
    pointer.pressed = buttons.pressed(MouseButton::Left);

    if egui_wants_pointer(&mut contexts) {
        pointer.valid = false;
        return;
    }

    let Ok(window) = windows.get_single() else {
        pointer.valid = false;
        return;
    };
    let Ok((camera, cam_transform)) = camera_q.get_single() else {
        pointer.valid = false;
        return;
    };
    let Some(screen_pos) = window.cursor_position() else {
        pointer.valid = false;
        return;
    };
    let Ok(ray) = camera.viewport_to_world(cam_transform, screen_pos) else {
        pointer.valid = false;
        return;
    };

    pointer.origin = ray.origin;
    pointer.dir = *ray.direction;
    pointer.valid = true;
    pointer.just_pressed = buttons.just_pressed(MouseButton::Left);
}
