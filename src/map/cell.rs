use bevy::prelude::*;

use crate::hex::metrics::{
    self, ELEVATION_STEP, RIVER_SURFACE_ELEVATION_OFFSET, STREAM_BED_ELEVATION_OFFSET,
};
use crate::hex::{HexCoordinates, HexDirection, HexEdgeType};

use super::chunk::ChunkId;

/// Index of a cell in the grid's cell arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct CellId(pub usize);

/// Elevation of a cell that has not been assigned one yet.
pub const UNSET_ELEVATION: i32 = i32::MIN;

/// Per-cell map state.
///
/// Cells are plain records; every mutation goes through
/// [`HexGrid`](super::grid::HexGrid), which owns all cells and can therefore
/// keep neighbor-spanning invariants (rivers, roads, adjacency) intact.
#[derive(Debug, Clone)]
pub struct HexCell {
    pub(super) coordinates: HexCoordinates,
    pub(super) color: LinearRgba,
    pub(super) elevation: i32,
    pub(super) position: Vec3,
    pub(super) neighbors: [Option<CellId>; 6],
    pub(super) incoming_river: Option<HexDirection>,
    pub(super) outgoing_river: Option<HexDirection>,
    pub(super) roads: [bool; 6],
    pub(super) chunk: ChunkId,
}

impl HexCell {
    pub(super) fn new(coordinates: HexCoordinates, position: Vec3, chunk: ChunkId) -> Self {
        Self {
            coordinates,
            color: LinearRgba::BLACK,
            elevation: UNSET_ELEVATION,
            position,
            neighbors: [None; 6],
            incoming_river: None,
            outgoing_river: None,
            roads: [false; 6],
            chunk,
        }
    }

    pub fn coordinates(&self) -> HexCoordinates {
        self.coordinates
    }

    pub fn color(&self) -> LinearRgba {
        self.color
    }

    pub fn elevation(&self) -> i32 {
        self.elevation
    }

    /// Grid-local center, height included.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn chunk(&self) -> ChunkId {
        self.chunk
    }

    pub fn neighbor(&self, direction: HexDirection) -> Option<CellId> {
        self.neighbors[direction.index()]
    }

    pub fn incoming_river(&self) -> Option<HexDirection> {
        self.incoming_river
    }

    pub fn outgoing_river(&self) -> Option<HexDirection> {
        self.outgoing_river
    }

    pub fn has_incoming_river(&self) -> bool {
        self.incoming_river.is_some()
    }

    pub fn has_outgoing_river(&self) -> bool {
        self.outgoing_river.is_some()
    }

    pub fn has_river(&self) -> bool {
        self.has_incoming_river() || self.has_outgoing_river()
    }

    /// A river starts or ends here (exactly one of incoming/outgoing).
    pub fn has_river_begin_or_end(&self) -> bool {
        self.has_incoming_river() != self.has_outgoing_river()
    }

    /// Edge of the river that begins or ends in this cell.
    pub fn river_begin_or_end_direction(&self) -> Option<HexDirection> {
        self.incoming_river.or(self.outgoing_river)
    }

    pub fn has_river_through_edge(&self, direction: HexDirection) -> bool {
        self.incoming_river == Some(direction) || self.outgoing_river == Some(direction)
    }

    pub fn has_road_through_edge(&self, direction: HexDirection) -> bool {
        self.roads[direction.index()]
    }

    pub fn has_roads(&self) -> bool {
        self.roads.iter().any(|&r| r)
    }

    pub fn edge_type_with(&self, other: &HexCell) -> HexEdgeType {
        metrics::edge_type(self.elevation, other.elevation)
    }

    pub fn stream_bed_y(&self) -> f32 {
        (self.elevation as f32 + STREAM_BED_ELEVATION_OFFSET) * ELEVATION_STEP
    }

    pub fn river_surface_y(&self) -> f32 {
        (self.elevation as f32 + RIVER_SURFACE_ELEVATION_OFFSET) * ELEVATION_STEP
    }

    /// Coordinate label shown by the UI layer.
    pub fn label(&self) -> String {
        self.coordinates.to_string_on_separate_lines()
    }
}
