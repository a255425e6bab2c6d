//! Orbital camera: orbits a focus point, pans with the keyboard, zooms with
//! the scroll wheel, orbits with right-mouse drag.

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;

const PAN_SPEED: f32 = 20.0;
const ZOOM_SPEED: f32 = 0.15;
const MIN_DISTANCE: f32 = 5.0;
const MAX_DISTANCE: f32 = 200.0;
const MIN_PITCH: f32 = 10.0 * std::f32::consts::PI / 180.0;
const MAX_PITCH: f32 = 85.0 * std::f32::consts::PI / 180.0;
const ORBIT_SENSITIVITY: f32 = 0.005;

/// Orbital camera model: the camera circles a focus point.
#[derive(Resource)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            yaw: 0.0,
            pitch: 40.0_f32.to_radians(),
            distance: 40.0,
        }
    }
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitCamera>()
            .add_systems(Startup, setup_camera)
            .add_systems(Update, (control_camera, apply_orbit_camera).chain());
    }
}

fn orbit_to_transform(orbit: &OrbitCamera) -> (Vec3, Vec3) {
    let x = orbit.distance * orbit.pitch.cos() * orbit.yaw.sin();
    let y = orbit.distance * orbit.pitch.sin();
    let z = orbit.distance * orbit.pitch.cos() * orbit.yaw.cos();
    (orbit.focus + Vec3::new(x, y, z), orbit.focus)
}

pub fn setup_camera(mut commands: Commands, orbit: Res<OrbitCamera>) {
    let (pos, look_at) = orbit_to_transform(&orbit);
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(pos).looking_at(look_at, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_4,
            0.4,
            0.0,
        )),
    ));
}

/// Keyboard pan, wheel zoom, right-drag orbit.
fn control_camera(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut wheel: EventReader<MouseWheel>,
    mut motion: EventReader<MouseMotion>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let dt = time.delta_secs();

    let mut pan = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        pan.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        pan.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        pan.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        pan.x += 1.0;
    }
    if pan != Vec2::ZERO {
        let forward = Vec2::new(orbit.yaw.sin(), orbit.yaw.cos());
        let right = Vec2::new(forward.y, -forward.x);
        let delta = (right * pan.x + forward * pan.y) * PAN_SPEED * dt;
        orbit.focus.x += delta.x;
        orbit.focus.z += delta.y;
    }

    for ev in wheel.read() {
        orbit.distance =
            (orbit.distance * (1.0 - ev.y * ZOOM_SPEED)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    if buttons.pressed(MouseButton::Right) {
        for ev in motion.read() {
            orbit.yaw -= ev.delta.x * ORBIT_SENSITIVITY;
            orbit.pitch = (orbit.pitch + ev.delta.y * ORBIT_SENSITIVITY)
                .clamp(MIN_PITCH, MAX_PITCH);
        }
    } else {
        motion.clear();
    }
}

/// Applies the orbit state to the camera transform.
pub fn apply_orbit_camera(
    orbit: Res<OrbitCamera>,
    mut query: Query<&mut Transform, With<Camera3d>>,
) {
    if !orbit.is_changed() {
        return;
    }
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    let (pos, look_at) = orbit_to_transform(&orbit);
    *transform = Transform::from_translation(pos).looking_at(look_at, Vec3::Y);
}
