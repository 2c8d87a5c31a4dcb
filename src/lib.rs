//! Editable hex map: cells with elevation, rivers and roads, chunked mesh
//! rebuilding and a brush editor on top.

pub mod camera;
#[cfg(feature = "native")]
pub mod cli;
pub mod editor;
pub mod hex;
pub mod map;
pub mod math;

use bevy::prelude::*;

/// Application-wide state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    /// Brush editing and camera movement.
    #[default]
    Editing,
    /// World inspector open (Tab to toggle).
    Inspecting,
}
