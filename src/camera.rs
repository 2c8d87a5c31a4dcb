//! Overhead map camera.
//!
//! WASD or arrow keys pan across the map, the scroll wheel zooms between a
//! minimum and maximum height. Pan speed scales with height so the map
//! scrolls at a similar on-screen rate at every zoom level.

mod entities;
mod systems;

pub use entities::MapCamera;

use bevy::prelude::*;

use crate::GameState;

/// Per-plugin configuration for the map camera.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct CameraConfig {
    /// Pan speed in world-units per second per unit of height.
    pub pan_speed: f32,
    /// Height change per scroll line.
    pub scroll_sensitivity: f32,
    /// Closest the camera may zoom in.
    pub min_height: f32,
    /// Furthest the camera may zoom out.
    pub max_height: f32,
    /// Height the camera spawns at.
    pub start_height: f32,
    /// Angle below the horizon the camera looks at (radians).
    pub tilt: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pan_speed: 1.2,
            scroll_sensitivity: 8.0,
            min_height: 20.0,
            max_height: 250.0,
            start_height: 120.0,
            tilt: 1.0,
        }
    }
}

/// Spawns and drives the [`MapCamera`].
pub struct MapCameraPlugin(pub CameraConfig);

impl Plugin for MapCameraPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<MapCamera>()
            .register_type::<CameraConfig>()
            .insert_resource(self.0.clone())
            .add_systems(Startup, systems::spawn_camera)
            .add_systems(
                Update,
                (systems::pan, systems::zoom).run_if(in_state(GameState::Editing)),
            );
    }
}
