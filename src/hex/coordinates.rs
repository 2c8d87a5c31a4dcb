use std::fmt;

use bevy::prelude::*;
use hexx::Hex;

use super::direction::HexDirection;
use super::metrics::{INNER_RADIUS, OUTER_RADIUS};

/// Largest cube component [`HexCoordinates::from_position`] resolves; keeps
/// every derived sum and offset well inside `i32`.
const MAX_COMPONENT: f32 = (1 << 24) as f32;

/// Cube coordinates of a hex cell (`x + y + z == 0`).
///
/// Stored axially as a [`Hex`] (`hex.x` is `x`, `hex.y` is `z`); the cube `y`
/// component is always derived, so the zero-sum invariant cannot break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexCoordinates(Hex);

impl HexCoordinates {
    pub const fn new(x: i32, z: i32) -> Self {
        Self(Hex::new(x, z))
    }

    /// Odd-row offset `(column, row)` to cube coordinates.
    pub const fn from_offset(column: i32, row: i32) -> Self {
        Self::new(column - row / 2, row)
    }

    /// Cube coordinates back to the odd-row offset `(column, row)`.
    pub const fn to_offset(self) -> (i32, i32) {
        (self.x() + self.z() / 2, self.z())
    }

    /// Coordinates of the cell containing a grid-local position.
    ///
    /// Only `x` and `z` of `position` are used. Returns `None` for non-finite
    /// positions and for positions too far out to address with `i32` cells.
    pub fn from_position(position: Vec3) -> Option<Self> {
        let mut x = position.x / (INNER_RADIUS * 2.0);
        let mut y = -x;
        let offset = position.z / (OUTER_RADIUS * 3.0);
        x -= offset;
        y -= offset;
        let z = -x - y;

        let (rx, ry, rz) = (x.round(), y.round(), z.round());
        if ![rx, ry, rz].iter().all(|c| c.is_finite() && c.abs() <= MAX_COMPONENT) {
            return None;
        }
        let mut ix = rx as i32;
        let iy = ry as i32;
        let mut iz = rz as i32;

        if ix + iy + iz != 0 {
            let dx = (x - rx).abs();
            let dy = (y - ry).abs();
            let dz = (z - rz).abs();

            if dx > dy && dx > dz {
                ix = -iy - iz;
            } else if dz > dy {
                iz = -ix - iy;
            }
        }

        Some(Self::new(ix, iz))
    }

    pub const fn x(self) -> i32 {
        self.0.x
    }

    pub const fn y(self) -> i32 {
        -self.0.x - self.0.y
    }

    pub const fn z(self) -> i32 {
        self.0.y
    }

    pub const fn hex(self) -> Hex {
        self.0
    }

    pub fn neighbor(self, direction: HexDirection) -> Self {
        let (dx, dz) = direction.offset();
        Self::new(self.x() + dx, self.z() + dz)
    }

    /// Number of cell steps between two coordinates.
    pub fn distance_to(self, other: Self) -> i32 {
        self.0.distance_to(other.0)
    }

    /// Label text: the three components on separate lines.
    pub fn to_string_on_separate_lines(self) -> String {
        format!("{}\n{}\n{}", self.x(), self.y(), self.z())
    }
}

impl From<Hex> for HexCoordinates {
    fn from(hex: Hex) -> Self {
        Self(hex)
    }
}

impl fmt::Display for HexCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x(), self.y(), self.z())
    }
}
