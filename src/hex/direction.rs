use bevy::prelude::Reflect;

/// One of the six edge directions of a pointy-top hex cell.
///
/// The discriminant doubles as the index into per-direction cell arrays
/// (neighbors, roads) and into the corner table of [`super::metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
#[repr(u8)]
pub enum HexDirection {
    NE = 0,
    E = 1,
    SE = 2,
    SW = 3,
    W = 4,
    NW = 5,
}

impl HexDirection {
    /// All six directions in triangulation order.
    pub const ALL: [HexDirection; 6] = [
        HexDirection::NE,
        HexDirection::E,
        HexDirection::SE,
        HexDirection::SW,
        HexDirection::W,
        HexDirection::NW,
    ];

    /// Direction for an index, wrapping modulo 6.
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    pub const fn previous(self) -> Self {
        Self::from_index(self.index() + 5)
    }

    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub const fn previous2(self) -> Self {
        Self::from_index(self.index() + 4)
    }

    pub const fn next2(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Cube-coordinate step `(dx, dz)` towards the neighbor in this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            HexDirection::NE => (0, 1),
            HexDirection::E => (1, 0),
            HexDirection::SE => (1, -1),
            HexDirection::SW => (0, -1),
            HexDirection::W => (-1, 0),
            HexDirection::NW => (-1, 1),
        }
    }
}
