//! Hex map: cells, chunks and triangulation, plus the plugin that keeps the
//! chunk meshes on screen in sync with the grid.

pub mod cell;
pub mod chunk;
pub mod error;
pub mod grid;
pub mod mesh;
pub mod triangulate;

mod entities;
mod startup_systems;
mod systems;

pub use cell::{CellId, HexCell};
pub use chunk::{ChunkId, HexGridChunk};
pub use entities::{ChunkLayer, HexMap, HexMapRoot, MapMaterials, MeshLayer};
pub use error::GridError;
pub use grid::{HexGrid, RefreshRequest};
pub use mesh::{ChunkMesh, MeshBuffers};
pub use triangulate::Triangulator;

use bevy::prelude::*;

/// Nested configuration for the map subsystem.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct HexMapConfig {
    /// Grid size, initial relief and noise parameters.
    pub grid: GridSettings,
    /// Background clear color.
    pub clear_color: Color,
    /// Illuminance of the directional sun light.
    pub sun_illuminance: f32,
}

/// How cells are shaped when the grid is first built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum ReliefMode {
    /// Every cell at elevation 0 with the default color.
    Flat,
    /// Elevation and color banded from a procedural height field.
    #[default]
    Banded,
}

/// Grid layout and noise parameters.
#[derive(Clone, Debug, Reflect)]
pub struct GridSettings {
    /// Chunks along x; each holds `CHUNK_SIZE_X` columns of cells.
    pub chunk_count_x: usize,
    /// Chunks along z; each holds `CHUNK_SIZE_Z` rows of cells.
    pub chunk_count_z: usize,
    /// Initial relief.
    pub relief: ReliefMode,
    /// Color every cell gets before the relief is applied.
    pub default_color: LinearRgba,
    /// Seed for the banded height field.
    pub height_noise_seed: u32,
    /// Number of octaves for the height field.
    pub height_noise_octaves: usize,
    /// Multiplier from world units to height-field units.
    pub height_noise_scale: f64,
    /// Seed for the vertex perturbation sampler.
    pub perturb_noise_seed: u32,
    /// Number of octaves for the perturbation sampler.
    pub perturb_noise_octaves: usize,
    /// Noise features per unit of scaled sample position.
    pub perturb_noise_frequency: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            chunk_count_x: 4,
            chunk_count_z: 3,
            relief: ReliefMode::Banded,
            default_color: LinearRgba::WHITE,
            height_noise_seed: 42,
            height_noise_octaves: 4,
            height_noise_scale: 0.012,
            perturb_noise_seed: 137,
            perturb_noise_octaves: 3,
            perturb_noise_frequency: 16.0,
        }
    }
}

impl Default for HexMapConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings::default(),
            clear_color: Color::srgb(0.45, 0.6, 0.75),
            sun_illuminance: 8_000.0,
        }
    }
}

/// Map plugin: builds the grid at startup and re-uploads dirty chunk meshes
/// after every frame's edits.
pub struct HexMapPlugin(pub HexMapConfig);

impl Plugin for HexMapPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<HexMapConfig>()
            .register_type::<ChunkLayer>()
            .register_type::<HexMapRoot>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(self.0.clear_color))
            .add_systems(Startup, startup_systems::generate_map)
            .add_systems(PostUpdate, systems::upload_dirty_chunks);
    }
}
