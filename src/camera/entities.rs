use bevy::prelude::*;

/// Marker component for the overhead camera the editor picks through.
#[derive(Component, Reflect)]
pub struct MapCamera;
