use bevy::prelude::*;

use super::chunk::ChunkId;
use super::grid::HexGrid;

/// The editable map. Systems mutate the grid; the upload system turns its
/// dirty chunks into meshes.
#[derive(Resource)]
pub struct HexMap {
    pub grid: HexGrid,
}

/// Marker on the entity that parents every chunk layer.
#[derive(Component, Reflect)]
pub struct HexMapRoot;

/// Which of a chunk's buffers an entity draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum MeshLayer {
    Terrain,
    Rivers,
    Roads,
}

/// One render layer of one chunk.
#[derive(Component, Clone, Copy, Debug, Reflect)]
pub struct ChunkLayer {
    pub chunk: ChunkId,
    pub layer: MeshLayer,
}

/// Shared materials, one per layer. Vertex colors carry the cell colors.
#[derive(Resource)]
pub struct MapMaterials {
    pub terrain: Handle<StandardMaterial>,
    pub rivers: Handle<StandardMaterial>,
    pub roads: Handle<StandardMaterial>,
}

impl MapMaterials {
    pub fn for_layer(&self, layer: MeshLayer) -> Handle<StandardMaterial> {
        match layer {
            MeshLayer::Terrain => self.terrain.clone(),
            MeshLayer::Rivers => self.rivers.clone(),
            MeshLayer::Roads => self.roads.clone(),
        }
    }
}
