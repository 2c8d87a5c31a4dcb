use bevy::prelude::*;

use super::cell::CellId;

/// Index of a chunk in the grid's chunk array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct ChunkId(pub usize);

/// A fixed block of cells that share one mesh and one rebuild flag.
///
/// The chunk only records which cells it draws; the cells themselves belong
/// to the grid.
#[derive(Debug, Clone)]
pub struct HexGridChunk {
    cells: Vec<Option<CellId>>,
    dirty: bool,
    labels_visible: bool,
}

impl HexGridChunk {
    pub(super) fn new(capacity: usize) -> Self {
        Self {
            cells: vec![None; capacity],
            dirty: false,
            labels_visible: false,
        }
    }

    pub(super) fn add_cell(&mut self, local_index: usize, cell: CellId) {
        self.cells[local_index] = Some(cell);
    }

    /// Cells in local row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells.iter().flatten().copied()
    }

    /// Schedules a rebuild on the next flush. Idempotent.
    pub fn refresh(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the rebuild flag, returning whether it was set.
    pub(super) fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn labels_visible(&self) -> bool {
        self.labels_visible
    }

    pub fn show_labels(&mut self, visible: bool) {
        self.labels_visible = visible;
    }
}
