use bevy::log::debug;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::chunk::ChunkId;
use super::entities::{ChunkLayer, HexMap, MeshLayer};
use super::mesh::ChunkMesh;

// ── PostUpdate: mesh upload ─────────────────────────────────────────

/// Triangulates every dirty chunk and swaps the new meshes onto its layer
/// entities. Empty layers are hidden.
pub fn upload_dirty_chunks(
    map: Option<ResMut<HexMap>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut layers: Query<(&ChunkLayer, &mut Mesh3d, &mut Visibility)>,
) {
    let Some(mut map) = map else { return };

    let rebuilt: HashMap<ChunkId, ChunkMesh> = map.grid.flush_dirty_chunks().into_iter().collect();
    if rebuilt.is_empty() {
        return;
    }

    for (layer, mut mesh3d, mut visibility) in &mut layers {
        let Some(chunk_mesh) = rebuilt.get(&layer.chunk) else {
            continue;
        };
        let buffers = match layer.layer {
            MeshLayer::Terrain => &chunk_mesh.terrain,
            MeshLayer::Rivers => &chunk_mesh.rivers,
            MeshLayer::Roads => &chunk_mesh.roads,
        };

        if buffers.is_empty() {
            *visibility = Visibility::Hidden;
            continue;
        }
        mesh3d.0 = meshes.add(buffers.to_mesh());
        *visibility = Visibility::Inherited;
    }

    debug!("uploaded {} rebuilt chunks", rebuilt.len());
}
