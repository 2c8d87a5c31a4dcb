use thiserror::Error;

use bevy::math::Vec3;

/// Errors from building or querying a [`HexGrid`](super::grid::HexGrid).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid needs at least one chunk, got {chunk_count_x}x{chunk_count_z}")]
    EmptyGrid {
        chunk_count_x: usize,
        chunk_count_z: usize,
    },

    #[error("no cell at {0}, position is outside the grid")]
    OutOfRange(Vec3),
}
