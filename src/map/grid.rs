use bevy::log::{debug, info, trace};
use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::hex::metrics::{
    self, CHUNK_SIZE_X, CHUNK_SIZE_Z, ELEVATION_PERTURB_STRENGTH, ELEVATION_STEP, INNER_RADIUS,
    OUTER_RADIUS,
};
use crate::hex::{HexCoordinates, HexDirection, HexEdgeType, NoiseSampler};
use crate::math;

use super::cell::{CellId, HexCell};
use super::chunk::{ChunkId, HexGridChunk};
use super::error::GridError;
use super::mesh::ChunkMesh;
use super::triangulate::Triangulator;
use super::{GridSettings, ReliefMode};

/// Which chunks a cell change has to rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRequest {
    /// Only the chunk owning the cell: the change is confined to the cell's
    /// own geometry (rivers, roads).
    SelfOnly,
    /// The owning chunk plus every neighboring chunk the cell borders: the
    /// change alters edges and corners shared with neighbors.
    Full,
}

/// The hex map: cell arena, chunk array, and the editing operations that keep
/// adjacency, river and road invariants intact.
pub struct HexGrid {
    cells: Vec<HexCell>,
    chunks: Vec<HexGridChunk>,
    cell_count_x: usize,
    cell_count_z: usize,
    chunk_count_x: usize,
    noise: Box<dyn NoiseSampler>,
    transform: Transform,
}

impl HexGrid {
    /// Builds the grid: noise source first, then chunks, then cells with
    /// their neighbor wiring and initial relief. Every chunk starts dirty.
    pub fn initialize(
        settings: &GridSettings,
        noise: Box<dyn NoiseSampler>,
    ) -> Result<Self, GridError> {
        if settings.chunk_count_x == 0 || settings.chunk_count_z == 0 {
            return Err(GridError::EmptyGrid {
                chunk_count_x: settings.chunk_count_x,
                chunk_count_z: settings.chunk_count_z,
            });
        }

        let cell_count_x = settings.chunk_count_x * CHUNK_SIZE_X;
        let cell_count_z = settings.chunk_count_z * CHUNK_SIZE_Z;

        let chunks = (0..settings.chunk_count_x * settings.chunk_count_z)
            .map(|_| HexGridChunk::new(CHUNK_SIZE_X * CHUNK_SIZE_Z))
            .collect();

        let mut grid = Self {
            cells: Vec::with_capacity(cell_count_x * cell_count_z),
            chunks,
            cell_count_x,
            cell_count_z,
            chunk_count_x: settings.chunk_count_x,
            noise,
            transform: Transform::default(),
        };

        let height_fbm: Fbm<Perlin> =
            Fbm::new(settings.height_noise_seed).set_octaves(settings.height_noise_octaves);

        for z in 0..cell_count_z {
            for x in 0..cell_count_x {
                grid.create_cell(x, z, settings, &height_fbm);
            }
        }

        for chunk in &mut grid.chunks {
            chunk.refresh();
        }

        info!(
            "hex grid ready: {}x{} cells in {}x{} chunks ({:?} relief)",
            cell_count_x,
            cell_count_z,
            settings.chunk_count_x,
            settings.chunk_count_z,
            settings.relief
        );
        Ok(grid)
    }

    fn create_cell(&mut self, x: usize, z: usize, settings: &GridSettings, height_fbm: &Fbm<Perlin>) {
        let i = self.cells.len();
        let position = Vec3::new(
            (x as f32 + z as f32 * 0.5 - (z / 2) as f32) * (INNER_RADIUS * 2.0),
            0.0,
            z as f32 * (OUTER_RADIUS * 1.5),
        );

        let chunk_x = x / CHUNK_SIZE_X;
        let chunk_z = z / CHUNK_SIZE_Z;
        let chunk = ChunkId(chunk_x + chunk_z * self.chunk_count_x);
        let local_x = x - chunk_x * CHUNK_SIZE_X;
        let local_z = z - chunk_z * CHUNK_SIZE_Z;

        let coordinates = HexCoordinates::from_offset(x as i32, z as i32);
        self.cells.push(HexCell::new(coordinates, position, chunk));
        let id = CellId(i);

        if x > 0 {
            self.set_neighbor(id, HexDirection::W, CellId(i - 1));
        }
        if z > 0 {
            let below = i - self.cell_count_x;
            if z & 1 == 0 {
                self.set_neighbor(id, HexDirection::SE, CellId(below));
                if x > 0 {
                    self.set_neighbor(id, HexDirection::SW, CellId(below - 1));
                }
            } else {
                self.set_neighbor(id, HexDirection::SW, CellId(below));
                if x < self.cell_count_x - 1 {
                    self.set_neighbor(id, HexDirection::SE, CellId(below + 1));
                }
            }
        }

        self.set_color(id, settings.default_color);
        match settings.relief {
            ReliefMode::Flat => self.set_elevation(id, 0),
            ReliefMode::Banded => {
                let sample = height_fbm.get([
                    position.x as f64 * settings.height_noise_scale,
                    position.z as f64 * settings.height_noise_scale,
                ]);
                let height = math::map_noise_to_range(sample, 0.0, 1.0).clamp(0.0, 1.0);
                let elevation = (height * 10.0) as i32 - 1;
                self.set_elevation(id, elevation);
                self.set_color(id, banded_color(elevation, height));
            }
        }

        self.chunks[chunk.0].add_cell(local_x + local_z * CHUNK_SIZE_X, id);
    }

    /// Links `cell` and `other` both ways; `other` sits in `direction`.
    fn set_neighbor(&mut self, cell: CellId, direction: HexDirection, other: CellId) {
        self.cells[cell.0].neighbors[direction.index()] = Some(other);
        self.cells[other.0].neighbors[direction.opposite().index()] = Some(cell);
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn cell(&self, id: CellId) -> &HexCell {
        &self.cells[id.0]
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellId, &HexCell)> + '_ {
        self.cells.iter().enumerate().map(|(i, c)| (CellId(i), c))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_count_x(&self) -> usize {
        self.cell_count_x
    }

    pub fn cell_count_z(&self) -> usize {
        self.cell_count_z
    }

    pub fn chunk(&self, id: ChunkId) -> &HexGridChunk {
        &self.chunks[id.0]
    }

    pub fn chunks(&self) -> impl Iterator<Item = (ChunkId, &HexGridChunk)> + '_ {
        self.chunks.iter().enumerate().map(|(i, c)| (ChunkId(i), c))
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn noise(&self) -> &dyn NoiseSampler {
        self.noise.as_ref()
    }

    pub fn neighbor(&self, cell: CellId, direction: HexDirection) -> Option<CellId> {
        self.cells[cell.0].neighbor(direction)
    }

    /// Absolute elevation difference across an edge, `None` without neighbor.
    pub fn elevation_difference(&self, cell: CellId, direction: HexDirection) -> Option<u32> {
        let cell = &self.cells[cell.0];
        let neighbor = cell.neighbor(direction)?;
        Some(cell.elevation.abs_diff(self.cells[neighbor.0].elevation))
    }

    pub fn edge_type(&self, cell: CellId, direction: HexDirection) -> Option<HexEdgeType> {
        let neighbor = self.neighbor(cell, direction)?;
        Some(self.edge_type_between(cell, neighbor))
    }

    pub fn edge_type_between(&self, a: CellId, b: CellId) -> HexEdgeType {
        self.cells[a.0].edge_type_with(&self.cells[b.0])
    }

    // ── Lookup ─────────────────────────────────────────────────────

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Places the grid in the world; lookups by world position use it.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// World-space center of a cell.
    pub fn world_position(&self, cell: CellId) -> Vec3 {
        self.transform.transform_point(self.cells[cell.0].position)
    }

    /// Cell under a world-space position.
    pub fn cell_at(&self, position: Vec3) -> Result<CellId, GridError> {
        let local = self
            .transform
            .compute_affine()
            .inverse()
            .transform_point3(position);
        HexCoordinates::from_position(local)
            .and_then(|coordinates| self.cell_by_coordinates(coordinates))
            .ok_or(GridError::OutOfRange(position))
    }

    pub fn cell_by_coordinates(&self, coordinates: HexCoordinates) -> Option<CellId> {
        let x = coordinates.x().checked_add(coordinates.z() / 2)?;
        self.cell_by_offset(x, coordinates.z())
    }

    pub fn cell_by_offset(&self, x: i32, z: i32) -> Option<CellId> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.cell_count_x)?;
        let z = usize::try_from(z).ok().filter(|&z| z < self.cell_count_z)?;
        Some(CellId(x + z * self.cell_count_x))
    }

    // ── Editing ────────────────────────────────────────────────────

    pub fn set_color(&mut self, id: CellId, color: LinearRgba) {
        let cell = &mut self.cells[id.0];
        if cell.color == color {
            return;
        }
        cell.color = color;
        self.refresh(id, RefreshRequest::Full);
    }

    /// Changes elevation and drops every river and road the new height makes
    /// invalid.
    pub fn set_elevation(&mut self, id: CellId, elevation: i32) {
        let cell = &mut self.cells[id.0];
        if cell.elevation == elevation {
            return;
        }
        cell.elevation = elevation;

        let mut position = cell.position;
        position.y = elevation as f32 * ELEVATION_STEP;
        position.y += (metrics::sample_noise(self.noise.as_ref(), position).y * 2.0 - 1.0)
            * ELEVATION_PERTURB_STRENGTH;
        cell.position = position;
        trace!("cell {} elevation -> {}", cell.coordinates, elevation);

        let (outgoing, incoming) = (cell.outgoing_river, cell.incoming_river);
        if let Some(d) = outgoing
            && self.neighbor_elevation(id, d).is_some_and(|e| e > elevation)
        {
            self.remove_outgoing_river(id);
        }
        if let Some(d) = incoming
            && self.neighbor_elevation(id, d).is_some_and(|e| e < elevation)
        {
            self.remove_incoming_river(id);
        }

        for d in HexDirection::ALL {
            if self.cells[id.0].roads[d.index()]
                && self.elevation_difference(id, d).is_some_and(|diff| diff > 1)
            {
                self.set_road(id, d, false);
            }
        }

        self.refresh(id, RefreshRequest::Full);
    }

    fn neighbor_elevation(&self, id: CellId, direction: HexDirection) -> Option<i32> {
        self.neighbor(id, direction).map(|n| self.cells[n.0].elevation)
    }

    /// Starts a river leaving `id` through `direction`. Ignored when there is
    /// no neighbor there or the neighbor is higher.
    pub fn set_outgoing_river(&mut self, id: CellId, direction: HexDirection) {
        let cell = &self.cells[id.0];
        if cell.outgoing_river == Some(direction) {
            return;
        }
        let Some(neighbor) = cell.neighbor(direction) else {
            return;
        };
        if self.cells[neighbor.0].elevation > cell.elevation {
            return;
        }

        self.remove_outgoing_river(id);
        if self.cells[id.0].incoming_river == Some(direction) {
            self.remove_incoming_river(id);
        }
        self.cells[id.0].outgoing_river = Some(direction);

        self.remove_incoming_river(neighbor);
        self.cells[neighbor.0].incoming_river = Some(direction.opposite());

        self.set_road(id, direction, false);
        self.refresh(id, RefreshRequest::SelfOnly);
        self.refresh(neighbor, RefreshRequest::SelfOnly);
        trace!(
            "river {} -> {}",
            self.cells[id.0].coordinates,
            self.cells[neighbor.0].coordinates
        );
    }

    pub fn remove_outgoing_river(&mut self, id: CellId) {
        let Some(direction) = self.cells[id.0].outgoing_river.take() else {
            return;
        };
        self.refresh(id, RefreshRequest::SelfOnly);
        if let Some(neighbor) = self.neighbor(id, direction) {
            self.cells[neighbor.0].incoming_river = None;
            self.refresh(neighbor, RefreshRequest::SelfOnly);
        }
    }

    pub fn remove_incoming_river(&mut self, id: CellId) {
        let Some(direction) = self.cells[id.0].incoming_river.take() else {
            return;
        };
        self.refresh(id, RefreshRequest::SelfOnly);
        if let Some(neighbor) = self.neighbor(id, direction) {
            self.cells[neighbor.0].outgoing_river = None;
            self.refresh(neighbor, RefreshRequest::SelfOnly);
        }
    }

    pub fn remove_river(&mut self, id: CellId) {
        self.remove_outgoing_river(id);
        self.remove_incoming_river(id);
    }

    /// Adds a road across `direction` unless one exists, a river crosses the
    /// edge, or the edge is steeper than one level.
    pub fn add_road(&mut self, id: CellId, direction: HexDirection) {
        let cell = &self.cells[id.0];
        if cell.roads[direction.index()] || cell.has_river_through_edge(direction) {
            return;
        }
        if self
            .elevation_difference(id, direction)
            .is_some_and(|diff| diff <= 1)
        {
            self.set_road(id, direction, true);
        }
    }

    pub fn remove_roads(&mut self, id: CellId) {
        for d in HexDirection::ALL {
            if self.cells[id.0].roads[d.index()] {
                self.set_road(id, d, false);
            }
        }
    }

    fn set_road(&mut self, id: CellId, direction: HexDirection, state: bool) {
        let Some(neighbor) = self.neighbor(id, direction) else {
            return;
        };
        if self.cells[id.0].roads[direction.index()] == state {
            return;
        }
        self.cells[id.0].roads[direction.index()] = state;
        self.cells[neighbor.0].roads[direction.opposite().index()] = state;
        self.refresh(neighbor, RefreshRequest::SelfOnly);
        self.refresh(id, RefreshRequest::SelfOnly);
    }

    // ── Refresh ────────────────────────────────────────────────────

    /// Chunks that must rebuild after `cell` changed.
    pub fn affected_chunks(&self, cell: CellId, request: RefreshRequest) -> Vec<ChunkId> {
        let cell = &self.cells[cell.0];
        let mut chunks = vec![cell.chunk];
        if request == RefreshRequest::Full {
            for neighbor in cell.neighbors.iter().flatten() {
                let chunk = self.cells[neighbor.0].chunk;
                if !chunks.contains(&chunk) {
                    chunks.push(chunk);
                }
            }
        }
        chunks
    }

    pub fn refresh(&mut self, cell: CellId, request: RefreshRequest) {
        for chunk in self.affected_chunks(cell, request) {
            self.chunks[chunk.0].refresh();
        }
    }

    /// Shows or hides coordinate labels on every chunk.
    pub fn show_labels(&mut self, visible: bool) {
        for chunk in &mut self.chunks {
            chunk.show_labels(visible);
        }
    }

    // ── Flushing ───────────────────────────────────────────────────

    /// Rebuilds the chunk's geometry if it is dirty, clearing the flag.
    pub fn flush_if_dirty(&mut self, chunk: ChunkId) -> Option<ChunkMesh> {
        if !self.chunks[chunk.0].take_dirty() {
            return None;
        }
        let mesh = Triangulator::new(self).triangulate_chunk(chunk);
        debug!(
            "rebuilt chunk {}: {} terrain, {} river, {} road triangles",
            chunk.0,
            mesh.terrain.triangle_count(),
            mesh.rivers.triangle_count(),
            mesh.roads.triangle_count()
        );
        Some(mesh)
    }

    /// Rebuilds every dirty chunk.
    pub fn flush_dirty_chunks(&mut self) -> Vec<(ChunkId, ChunkMesh)> {
        (0..self.chunks.len())
            .map(ChunkId)
            .filter_map(|id| self.flush_if_dirty(id).map(|mesh| (id, mesh)))
            .collect()
    }
}

/// Initial cell color for banded relief: water, sand, grass, snow.
fn banded_color(elevation: i32, height: f32) -> LinearRgba {
    let (base, factor) = match elevation {
        i32::MIN..=2 => (LinearRgba::rgb(0.0, 0.0, 1.0), 3.0),
        3 => (LinearRgba::rgb(1.0, 0.92, 0.016), 2.0),
        4..=5 => (LinearRgba::rgb(0.0, 1.0, 0.0), 1.2),
        _ => (LinearRgba::rgb(1.0, 1.0, 1.0), 0.95),
    };
    (base * (height * factor)).with_alpha(base.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{ConstantNoise, PerlinNoiseSource};

    fn settings(chunks_x: usize, chunks_z: usize) -> GridSettings {
        GridSettings {
            chunk_count_x: chunks_x,
            chunk_count_z: chunks_z,
            relief: ReliefMode::Flat,
            ..GridSettings::default()
        }
    }

    fn flat_grid(chunks_x: usize, chunks_z: usize) -> HexGrid {
        let mut grid =
            HexGrid::initialize(&settings(chunks_x, chunks_z), Box::new(ConstantNoise::NEUTRAL))
                .expect("valid settings");
        grid.flush_dirty_chunks();
        grid
    }

    fn at(grid: &HexGrid, x: i32, z: i32) -> CellId {
        grid.cell_by_offset(x, z).expect("cell in grid")
    }

    fn dirty_chunks(grid: &HexGrid) -> Vec<ChunkId> {
        grid.chunks()
            .filter(|(_, c)| c.is_dirty())
            .map(|(id, _)| id)
            .collect()
    }

    fn assert_invariants(grid: &HexGrid) {
        for (id, cell) in grid.cells() {
            for d in HexDirection::ALL {
                let neighbor = cell.neighbor(d);
                if let Some(n) = neighbor {
                    assert_eq!(grid.neighbor(n, d.opposite()), Some(id), "adjacency");
                }
                if cell.outgoing_river() == Some(d) {
                    let n = neighbor.expect("river needs a neighbor");
                    assert!(cell.elevation() >= grid.cell(n).elevation(), "river uphill");
                    assert_eq!(grid.cell(n).incoming_river(), Some(d.opposite()), "pairing");
                }
                if cell.incoming_river() == Some(d) {
                    let n = neighbor.expect("river needs a neighbor");
                    assert_eq!(grid.cell(n).outgoing_river(), Some(d.opposite()), "pairing");
                }
                if cell.has_road_through_edge(d) {
                    let n = neighbor.expect("road needs a neighbor");
                    assert!(grid.elevation_difference(id, d).is_some_and(|diff| diff <= 1));
                    assert!(!cell.has_river_through_edge(d), "road across river");
                    assert!(grid.cell(n).has_road_through_edge(d.opposite()), "road symmetry");
                }
            }
        }
    }

    // ── initialize ─────────────────────────────────────────────────

    #[test]
    fn empty_grid_is_rejected() {
        let err = HexGrid::initialize(&settings(0, 2), Box::new(ConstantNoise::NEUTRAL));
        assert!(matches!(err, Err(GridError::EmptyGrid { .. })));
    }

    #[test]
    fn initialize_builds_all_cells_and_dirty_chunks() {
        let grid =
            HexGrid::initialize(&settings(3, 2), Box::new(ConstantNoise::NEUTRAL)).unwrap();
        assert_eq!(grid.cell_count(), 3 * 2 * CHUNK_SIZE_X * CHUNK_SIZE_Z);
        assert_eq!(grid.chunk_count(), 6);
        assert!(grid.chunks().all(|(_, c)| c.is_dirty()));
    }

    #[test]
    fn adjacency_is_symmetric() {
        let grid = flat_grid(2, 2);
        for (id, cell) in grid.cells() {
            for d in HexDirection::ALL {
                if let Some(n) = cell.neighbor(d) {
                    assert_eq!(grid.neighbor(n, d.opposite()), Some(id));
                }
            }
        }
    }

    #[test]
    fn neighbors_match_coordinate_steps() {
        let grid = flat_grid(2, 2);
        for (_, cell) in grid.cells() {
            for d in HexDirection::ALL {
                let expected = grid.cell_by_coordinates(cell.coordinates().neighbor(d));
                assert_eq!(cell.neighbor(d), expected, "{} {d:?}", cell.coordinates());
            }
        }
    }

    #[test]
    fn every_cell_lands_in_the_chunk_of_its_block() {
        let grid = flat_grid(3, 2);
        let mut seen = vec![0; grid.cell_count()];
        for (chunk_id, chunk) in grid.chunks() {
            assert_eq!(chunk.cells().count(), CHUNK_SIZE_X * CHUNK_SIZE_Z);
            for id in chunk.cells() {
                seen[id.0] += 1;
                assert_eq!(grid.cell(id).chunk(), chunk_id);
                let (x, z) = grid.cell(id).coordinates().to_offset();
                let expected = x as usize / CHUNK_SIZE_X + (z as usize / CHUNK_SIZE_Z) * 3;
                assert_eq!(chunk_id.0, expected);
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn flat_relief_starts_at_sea_level_with_default_color() {
        let grid = flat_grid(1, 1);
        let color = GridSettings::default().default_color;
        for (_, cell) in grid.cells() {
            assert_eq!(cell.elevation(), 0);
            assert_eq!(cell.color(), color);
            assert_eq!(cell.position().y, 0.0);
        }
    }

    #[test]
    fn banded_relief_colors_by_elevation() {
        let s = GridSettings {
            chunk_count_x: 2,
            chunk_count_z: 2,
            relief: ReliefMode::Banded,
            ..GridSettings::default()
        };
        let grid = HexGrid::initialize(&s, Box::new(PerlinNoiseSource::new(1, 2, 16.0))).unwrap();
        for (_, cell) in grid.cells() {
            assert!((-1..=9).contains(&cell.elevation()));
            assert_eq!(cell.color().alpha, 1.0, "brightness scaling keeps alpha");
            if cell.elevation() <= 2 {
                assert_eq!(cell.color().red, 0.0);
                assert_eq!(cell.color().green, 0.0);
            }
        }
        assert_invariants(&grid);
    }

    // ── lookup ─────────────────────────────────────────────────────

    #[test]
    fn lookup_by_coordinates_outside_grid_is_none() {
        let grid = flat_grid(1, 1);
        assert!(grid.cell_by_coordinates(HexCoordinates::new(-1, 0)).is_none());
        assert!(grid.cell_by_coordinates(HexCoordinates::new(0, -1)).is_none());
        assert!(grid.cell_by_coordinates(HexCoordinates::new(5, 0)).is_none());
        assert!(grid.cell_by_coordinates(HexCoordinates::new(0, 5)).is_none());
        assert!(grid.cell_by_coordinates(HexCoordinates::new(-2, 4)).is_some());
    }

    #[test]
    fn lookup_by_coordinates_uses_row_stagger() {
        let grid = flat_grid(1, 1);
        let id = grid.cell_by_coordinates(HexCoordinates::new(1, 3)).unwrap();
        assert_eq!(id, CellId(1 + 3 * 5 + 3 / 2));
    }

    #[test]
    fn lookup_by_position_finds_cell_centers() {
        let grid = flat_grid(2, 1);
        for (id, cell) in grid.cells() {
            assert_eq!(grid.cell_at(cell.position()), Ok(id));
        }
    }

    #[test]
    fn lookup_by_position_honors_grid_transform() {
        let mut grid = flat_grid(1, 1);
        let offset = Vec3::new(100.0, 0.0, -50.0);
        grid.set_transform(Transform::from_translation(offset));
        let id = at(&grid, 2, 2);
        assert_eq!(grid.cell_at(grid.cell(id).position() + offset), Ok(id));
        assert_eq!(grid.world_position(id), grid.cell(id).position() + offset);
    }

    #[test]
    fn lookup_by_position_outside_grid_is_an_error() {
        let grid = flat_grid(1, 1);
        let far = Vec3::new(-500.0, 0.0, 900.0);
        assert!(matches!(grid.cell_at(far), Err(GridError::OutOfRange(_))));
    }

    #[test]
    fn lookup_by_extreme_position_is_an_error() {
        let grid = flat_grid(1, 1);
        for far in [
            Vec3::new(0.0, 0.0, 1.0e12),
            Vec3::new(-1.0e12, 0.0, 1.0e12),
            Vec3::new(f32::NAN, 0.0, 0.0),
            Vec3::new(0.0, 0.0, f32::NEG_INFINITY),
        ] {
            assert!(
                matches!(grid.cell_at(far), Err(GridError::OutOfRange(_))),
                "{far}"
            );
        }
    }

    #[test]
    fn lookup_by_extreme_coordinates_is_none() {
        let grid = flat_grid(1, 1);
        assert_eq!(grid.cell_by_coordinates(HexCoordinates::new(i32::MAX, 4)), None);
        assert_eq!(grid.cell_by_coordinates(HexCoordinates::new(i32::MIN, -4)), None);
    }

    // ── edge types ─────────────────────────────────────────────────

    #[test]
    fn edge_type_follows_elevation_difference() {
        let mut grid = flat_grid(1, 1);
        let a = at(&grid, 1, 1);
        let east = grid.neighbor(a, HexDirection::E).unwrap();
        assert_eq!(grid.edge_type(a, HexDirection::E), Some(HexEdgeType::Flat));
        grid.set_elevation(east, 1);
        assert_eq!(grid.edge_type(a, HexDirection::E), Some(HexEdgeType::Slope));
        grid.set_elevation(east, 3);
        assert_eq!(grid.edge_type_between(a, east), HexEdgeType::Cliff);
        assert_eq!(grid.edge_type(at(&grid, 0, 0), HexDirection::W), None);
    }

    // ── rivers ─────────────────────────────────────────────────────

    #[test]
    fn raising_river_source_keeps_river_until_target_climbs_above() {
        let mut grid = flat_grid(1, 1);
        let origin = at(&grid, 0, 0);
        let target = grid.neighbor(origin, HexDirection::NE).unwrap();
        grid.set_outgoing_river(origin, HexDirection::NE);
        assert_eq!(grid.cell(origin).outgoing_river(), Some(HexDirection::NE));
        assert_eq!(grid.cell(target).incoming_river(), Some(HexDirection::SW));

        grid.set_elevation(origin, 3);
        assert!(grid.cell(origin).has_outgoing_river());

        grid.set_elevation(target, 4);
        assert!(!grid.cell(origin).has_outgoing_river());
        assert!(!grid.cell(target).has_incoming_river());
        assert_invariants(&grid);
    }

    #[test]
    fn river_scenario_from_top_row_to_south_east() {
        let mut grid = flat_grid(1, 1);
        let source = at(&grid, 0, 4);
        let target = grid.neighbor(source, HexDirection::SE).expect("SE neighbor");

        grid.set_outgoing_river(source, HexDirection::SE);
        assert!(grid.cell(source).has_outgoing_river());
        assert_eq!(grid.cell(source).outgoing_river(), Some(HexDirection::SE));
        assert!(grid.cell(target).has_incoming_river());
        assert_eq!(grid.cell(target).incoming_river(), Some(HexDirection::NW));

        // Raising the receiving cell above the source breaks the downhill rule.
        grid.set_elevation(target, 3);
        assert!(!grid.cell(source).has_outgoing_river());
        assert!(!grid.cell(target).has_incoming_river());
        assert_invariants(&grid);
    }

    #[test]
    fn lowering_source_below_target_removes_outgoing_river() {
        let mut grid = flat_grid(1, 1);
        let source = at(&grid, 2, 2);
        let target = grid.neighbor(source, HexDirection::E).unwrap();
        grid.set_outgoing_river(source, HexDirection::E);
        grid.set_elevation(source, -1);
        assert!(!grid.cell(source).has_river());
        assert!(!grid.cell(target).has_river());
    }

    #[test]
    fn rivers_cannot_run_uphill_or_off_the_map() {
        let mut grid = flat_grid(1, 1);
        let a = at(&grid, 2, 2);
        let east = grid.neighbor(a, HexDirection::E).unwrap();
        grid.set_elevation(east, 1);
        grid.set_outgoing_river(a, HexDirection::E);
        assert!(!grid.cell(a).has_river());

        let corner = at(&grid, 0, 0);
        grid.set_outgoing_river(corner, HexDirection::W);
        assert!(!grid.cell(corner).has_river());
    }

    #[test]
    fn new_outgoing_river_replaces_old_one() {
        let mut grid = flat_grid(1, 1);
        let a = at(&grid, 2, 2);
        let east = grid.neighbor(a, HexDirection::E).unwrap();
        let west = grid.neighbor(a, HexDirection::W).unwrap();
        grid.set_outgoing_river(a, HexDirection::E);
        grid.set_outgoing_river(a, HexDirection::W);
        assert_eq!(grid.cell(a).outgoing_river(), Some(HexDirection::W));
        assert!(!grid.cell(east).has_incoming_river());
        assert_eq!(grid.cell(west).incoming_river(), Some(HexDirection::E));
        assert_invariants(&grid);
    }

    #[test]
    fn reversing_a_river_clears_the_incoming_edge() {
        let mut grid = flat_grid(1, 1);
        let a = at(&grid, 2, 2);
        let east = grid.neighbor(a, HexDirection::E).unwrap();
        grid.set_outgoing_river(east, HexDirection::W);
        assert_eq!(grid.cell(a).incoming_river(), Some(HexDirection::E));
        grid.set_outgoing_river(a, HexDirection::E);
        assert_eq!(grid.cell(a).outgoing_river(), Some(HexDirection::E));
        assert!(!grid.cell(a).has_incoming_river());
        assert!(!grid.cell(east).has_outgoing_river());
        assert_invariants(&grid);
    }

    #[test]
    fn river_into_cell_with_river_replaces_its_source() {
        let mut grid = flat_grid(1, 1);
        let target = at(&grid, 2, 2);
        let west = grid.neighbor(target, HexDirection::W).unwrap();
        let east = grid.neighbor(target, HexDirection::E).unwrap();
        grid.set_outgoing_river(west, HexDirection::E);
        grid.set_outgoing_river(east, HexDirection::W);
        assert_eq!(grid.cell(target).incoming_river(), Some(HexDirection::E));
        assert!(!grid.cell(west).has_outgoing_river());
        assert_invariants(&grid);
    }

    #[test]
    fn remove_river_clears_both_ends() {
        let mut grid = flat_grid(1, 1);
        let a = at(&grid, 2, 2);
        let west = grid.neighbor(a, HexDirection::W).unwrap();
        let east = grid.neighbor(a, HexDirection::E).unwrap();
        grid.set_outgoing_river(west, HexDirection::E);
        grid.set_outgoing_river(a, HexDirection::E);
        grid.remove_river(a);
        for id in [west, a, east] {
            assert!(!grid.cell(id).has_river());
        }
    }

    // ── roads ──────────────────────────────────────────────────────

    #[test]
    fn road_scenario_steep_neighbor_removes_road() {
        let mut grid = flat_grid(1, 1);
        let a = at(&grid, 2, 2);
        let ne = grid.neighbor(a, HexDirection::NE).unwrap();
        grid.set_elevation(a, 2);
        grid.set_elevation(ne, 2);
        grid.add_road(a, HexDirection::NE);
        assert!(grid.cell(a).has_road_through_edge(HexDirection::NE));
        assert!(grid.cell(ne).has_road_through_edge(HexDirection::SW));

        grid.set_elevation(ne, 4);
        assert!(!grid.cell(a).has_road_through_edge(HexDirection::NE));
        assert!(!grid.cell(ne).has_road_through_edge(HexDirection::SW));
    }

    #[test]
    fn roads_refuse_steep_edges_rivers_and_missing_neighbors() {
        let mut grid = flat_grid(1, 1);
        let a = at(&grid, 2, 2);
        let e = grid.neighbor(a, HexDirection::E).unwrap();
        grid.set_elevation(e, 2);
        grid.add_road(a, HexDirection::E);
        assert!(!grid.cell(a).has_roads());

        grid.set_outgoing_river(a, HexDirection::W);
        grid.add_road(a, HexDirection::W);
        assert!(!grid.cell(a).has_road_through_edge(HexDirection::W));

        let corner = at(&grid, 0, 0);
        grid.add_road(corner, HexDirection::SW);
        assert!(!grid.cell(corner).has_roads());
    }

    #[test]
    fn river_replaces_road_on_its_edge() {
        let mut grid = flat_grid(1, 1);
        let a = at(&grid, 2, 2);
        let e = grid.neighbor(a, HexDirection::E).unwrap();
        grid.add_road(a, HexDirection::E);
        grid.set_outgoing_river(a, HexDirection::E);
        assert!(!grid.cell(a).has_road_through_edge(HexDirection::E));
        assert!(!grid.cell(e).has_road_through_edge(HexDirection::W));
        assert_invariants(&grid);
    }

    #[test]
    fn remove_roads_clears_both_sides() {
        let mut grid = flat_grid(1, 1);
        let a = at(&grid, 2, 2);
        for d in HexDirection::ALL {
            grid.add_road(a, d);
        }
        assert!(HexDirection::ALL.iter().all(|&d| grid.cell(a).has_road_through_edge(d)));
        grid.remove_roads(a);
        assert!(!grid.cell(a).has_roads());
        for d in HexDirection::ALL {
            let n = grid.neighbor(a, d).unwrap();
            assert!(!grid.cell(n).has_roads());
        }
    }

    // ── idempotence and refresh ────────────────────────────────────

    #[test]
    fn no_op_edits_schedule_no_rebuild() {
        let mut grid = flat_grid(2, 2);
        let a = at(&grid, 2, 2);
        grid.add_road(a, HexDirection::E);
        grid.flush_dirty_chunks();
        let before: Vec<_> = grid.cells().map(|(_, c)| c.clone()).collect();

        grid.remove_river(a);
        grid.add_road(a, HexDirection::E);
        grid.set_elevation(a, 0);
        let color = grid.cell(a).color();
        grid.set_color(a, color);

        assert!(dirty_chunks(&grid).is_empty());
        for ((_, now), was) in grid.cells().zip(&before) {
            assert_eq!(now.roads, was.roads);
            assert_eq!(now.incoming_river(), was.incoming_river());
            assert_eq!(now.outgoing_river(), was.outgoing_river());
        }
    }

    #[test]
    fn full_refresh_reaches_bordering_chunks_only() {
        let mut grid = flat_grid(2, 2);
        // Last column of chunk 0, bordering chunk 1 to the east.
        let border = at(&grid, 4, 2);
        grid.set_color(border, LinearRgba::rgb(1.0, 0.0, 0.0));
        assert_eq!(dirty_chunks(&grid), vec![ChunkId(0), ChunkId(1)]);

        grid.flush_dirty_chunks();
        let inner = at(&grid, 2, 2);
        grid.set_elevation(inner, 1);
        assert_eq!(dirty_chunks(&grid), vec![ChunkId(0)]);
    }

    #[test]
    fn self_only_refresh_stays_in_owning_chunk() {
        let grid = flat_grid(2, 2);
        // First cell of chunk 2, touching chunks 0, 1 and 3 as well.
        let border = at(&grid, 4, 5);
        assert_eq!(
            grid.affected_chunks(border, RefreshRequest::SelfOnly),
            vec![ChunkId(2)]
        );
        let mut full = grid.affected_chunks(border, RefreshRequest::Full);
        full.sort();
        assert_eq!(full, vec![ChunkId(0), ChunkId(1), ChunkId(2), ChunkId(3)]);
    }

    #[test]
    fn flush_clears_dirty_flags_once() {
        let mut grid =
            HexGrid::initialize(&settings(2, 1), Box::new(ConstantNoise::NEUTRAL)).unwrap();
        assert_eq!(grid.flush_dirty_chunks().len(), 2);
        assert!(grid.flush_dirty_chunks().is_empty());
        assert!(grid.flush_if_dirty(ChunkId(0)).is_none());
    }

    #[test]
    fn show_labels_fans_out_to_all_chunks() {
        let mut grid = flat_grid(2, 2);
        grid.show_labels(true);
        assert!(grid.chunks().all(|(_, c)| c.labels_visible()));
        grid.show_labels(false);
        assert!(grid.chunks().all(|(_, c)| !c.labels_visible()));
    }

    // ── invariants under mixed edits ───────────────────────────────

    #[test]
    fn invariants_hold_after_mixed_edits() {
        let mut grid = HexGrid::initialize(&settings(2, 2), Box::new(PerlinNoiseSource::new(5, 2, 16.0)))
            .unwrap();
        let n = grid.cell_count();
        for step in 0..400usize {
            let id = CellId((step * 37 + 11) % n);
            let d = HexDirection::from_index(step * 7 + 3);
            match step % 5 {
                0 => grid.set_elevation(id, ((step * 13) % 7) as i32 - 1),
                1 => grid.set_outgoing_river(id, d),
                2 => grid.add_road(id, d),
                3 if step % 3 == 0 => grid.remove_river(id),
                _ => grid.set_color(id, LinearRgba::rgb(0.1 * (step % 10) as f32, 0.5, 0.2)),
            }
            assert_invariants(&grid);
        }
    }
}
