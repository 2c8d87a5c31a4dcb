use bevy::asset::RenderAssetUsages;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;

/// Append-only triangle soup: positions, one color per position, and index
/// triples into the positions.
///
/// Positions are pushed exactly as given; perturbation is the caller's job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<Vec3>,
    pub colors: Vec<LinearRgba>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn clear(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.indices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn add_triangle(&mut self, v: [Vec3; 3], c: [LinearRgba; 3]) {
        let base = self.positions.len() as u32;
        self.positions.extend(v);
        self.colors.extend(c);
        self.indices.extend([base, base + 1, base + 2]);
    }

    /// Quad `v1 v2` / `v3 v4` as two triangles; `v3 v4` is the far side.
    pub fn add_quad(&mut self, v: [Vec3; 4], c: [LinearRgba; 4]) {
        let base = self.positions.len() as u32;
        self.positions.extend(v);
        self.colors.extend(c);
        self.indices
            .extend([base, base + 2, base + 1, base + 1, base + 2, base + 3]);
    }

    /// Whether every index points at a vertex and every vertex has a color.
    pub fn is_consistent(&self) -> bool {
        let n = self.positions.len() as u32;
        self.indices.len() % 3 == 0
            && self.colors.len() == self.positions.len()
            && self.indices.iter().all(|&i| i < n)
    }

    /// Builds a render mesh that keeps its data in the main world too, so
    /// ray casts for picking hit the same triangles that are drawn. Shared
    /// vertices get the area-weighted normal of their faces.
    pub fn to_mesh(&self) -> Mesh {
        let positions: Vec<[f32; 3]> = self.positions.iter().map(|p| p.to_array()).collect();
        let colors: Vec<[f32; 4]> = self
            .colors
            .iter()
            .map(|c| [c.red, c.green, c.blue, c.alpha])
            .collect();

        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
            .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
            .with_inserted_indices(Indices::U32(self.indices.clone()))
            .with_computed_smooth_normals()
    }
}

/// Geometry of one chunk, one buffer set per render layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    pub terrain: MeshBuffers,
    pub rivers: MeshBuffers,
    pub roads: MeshBuffers,
}

impl ChunkMesh {
    pub fn layers(&self) -> [&MeshBuffers; 3] {
        [&self.terrain, &self.rivers, &self.roads]
    }

    pub fn is_consistent(&self) -> bool {
        self.layers().iter().all(|l| l.is_consistent())
    }
}
