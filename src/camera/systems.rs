use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::render::view::Hdr;

use super::CameraConfig;
use super::entities::MapCamera;
use crate::hex::metrics::{INNER_RADIUS, OUTER_RADIUS};
use crate::map::HexMap;
use crate::math;

/// Spawns the Camera3d above the map origin, tilted toward +Z.
pub fn spawn_camera(mut commands: Commands, cfg: Res<CameraConfig>) {
    commands.spawn((
        Name::new("MapCamera"),
        Camera3d::default(),
        Hdr,
        Tonemapping::TonyMcMapface,
        Transform::from_xyz(0.0, cfg.start_height, 0.0)
            .with_rotation(Quat::from_rotation_x(-cfg.tilt)),
        MapCamera,
    ));
}

/// Moves the camera over the XZ plane, clamped to the map extents.
pub fn pan(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    cfg: Res<CameraConfig>,
    map: Option<Res<HexMap>>,
    mut query: Query<&mut Transform, With<MapCamera>>,
) {
    let Ok(mut transform) = query.single_mut() else {
        return;
    };

    let mut direction = Vec3::ZERO;
    if keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        direction -= Vec3::Z;
    }
    if keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        direction += Vec3::Z;
    }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        direction += Vec3::X;
    }
    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        direction -= Vec3::X;
    }
    if direction == Vec3::ZERO {
        return;
    }

    let speed = cfg.pan_speed * transform.translation.y;
    let delta = direction.normalize() * speed * time.delta_secs();
    transform.translation.x += delta.x;
    transform.translation.z += delta.z;

    // The map is centered on the origin; keep the focus over it.
    if let Some(map) = map {
        let half_x = (map.grid.cell_count_x() as f32 - 0.5) * INNER_RADIUS;
        let half_z = (map.grid.cell_count_z() as f32 - 1.0) * OUTER_RADIUS * 0.75;
        let offset = transform.translation.y / cfg.tilt.tan();
        transform.translation.x = transform.translation.x.clamp(-half_x, half_x);
        transform.translation.z = transform
            .translation
            .z
            .clamp(-half_z + offset, half_z + offset);
    }
}

/// Scroll wheel zoom between the configured heights.
pub fn zoom(
    mut scroll: MessageReader<MouseWheel>,
    cfg: Res<CameraConfig>,
    mut query: Query<&mut Transform, With<MapCamera>>,
) {
    let Ok(mut transform) = query.single_mut() else {
        return;
    };

    let mut lines = 0.0;
    for ev in scroll.read() {
        lines += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / 40.0,
        };
    }
    if lines == 0.0 {
        return;
    }

    let dy = math::clamp_zoom(
        transform.translation.y,
        -lines * cfg.scroll_sensitivity,
        cfg.min_height,
        cfg.max_height,
    );
    // Slide along the view ray so the focus point stays put.
    let back = transform.back();
    let along = dy / back.y;
    transform.translation += back * along;
}
